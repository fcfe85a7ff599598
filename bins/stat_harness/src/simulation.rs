use reprand::{decode, encode, Random};
use shared::AppResult;
use tracing::{info, warn};

use crate::report::{build_summary, HarnessSummary, ScenarioReport};
use crate::scenario::{factorial, HarnessConfig, ScenarioDefinition, ScenarioKind};

/// Standard normal quantile for the upper 0.1% tail.
const Z_999: f64 = 3.090_232;

/// Runs every scenario with a seed drawn from `master`.
///
/// Seeds come from `master.next_u64()`, so a master restored from a saved
/// state continues with fresh scenario seeds instead of repeating the last run.
pub fn run_all_scenarios(config: &HarnessConfig, master: &mut Random) -> AppResult<HarnessSummary> {
    let mut reports = Vec::with_capacity(config.scenarios.len());

    for scenario in &config.scenarios {
        let seed = master.next_u64();
        let report = run_single_scenario(scenario, seed)?;
        if report.passes {
            info!(
                scenario = %scenario.name,
                kind = %report.kind,
                seed,
                chi_square = ?report.chi_square,
                "scenario passed"
            );
        } else {
            warn!(
                scenario = %scenario.name,
                kind = %report.kind,
                seed,
                violations = report.violations,
                "scenario failed"
            );
        }
        reports.push(report);
    }

    Ok(build_summary(config.seed, encode(master), reports))
}

pub fn run_single_scenario(def: &ScenarioDefinition, seed: u64) -> AppResult<ScenarioReport> {
    let mut rng = Random::new(seed);
    let mut notes = Vec::new();

    let (counts, violations) = match def.kind {
        ScenarioKind::Uniform { bound } => {
            let mut counts = vec![0u64; bound as usize];
            let mut violations = 0;
            for _ in 0..def.trials {
                let value = rng.get_u32(bound)?;
                match counts.get_mut(value as usize) {
                    Some(cell) => *cell += 1,
                    None => violations += 1,
                }
            }
            (Some(counts), violations)
        }
        ScenarioKind::Real { buckets } => {
            let mut counts = vec![0u64; buckets as usize];
            let mut violations = 0;
            for _ in 0..def.trials {
                let value = rng.get_real64();
                if !(0.0..1.0).contains(&value) {
                    violations += 1;
                    continue;
                }
                let cell = ((value * f64::from(buckets)) as usize).min(counts.len() - 1);
                counts[cell] += 1;
            }
            (Some(counts), violations)
        }
        ScenarioKind::Sample { population, choose } => {
            let members: Vec<u32> = (0..population).collect();
            let mut choices = vec![0u32; choose as usize];
            let mut counts = vec![0u64; population as usize];
            let mut violations = 0;
            for _ in 0..def.trials {
                rng.sample(&members, &mut choices)?;
                let mut seen = vec![false; population as usize];
                for &choice in &choices {
                    match seen.get_mut(choice as usize) {
                        Some(flag) if !*flag => {
                            *flag = true;
                            counts[choice as usize] += 1;
                        }
                        _ => violations += 1,
                    }
                }
            }
            (Some(counts), violations)
        }
        ScenarioKind::Shuffle { length } => {
            let mut counts = vec![0u64; factorial(length)];
            let mut violations = 0;
            for _ in 0..def.trials {
                let mut values: Vec<u32> = (0..length).collect();
                rng.shuffle(&mut values)?;
                match permutation_index(&values) {
                    Some(index) => counts[index] += 1,
                    None => violations += 1,
                }
            }
            (Some(counts), violations)
        }
        ScenarioKind::Checkpoint { draws } => {
            let mut violations = 0;
            for _ in 0..def.trials {
                let skip = rng.get_u32(1_000)?;
                rng.discard(u64::from(skip));
                let mut restored = decode(&encode(&rng))?;
                let diverged = (0..draws).any(|_| restored.next_u32() != rng.next_u32());
                if diverged {
                    violations += 1;
                }
            }
            (None, violations)
        }
    };

    let mut chi_square = None;
    let mut critical_value = None;
    if let Some(counts) = counts.as_deref() {
        let observed: u64 = counts.iter().sum();
        if observed > 0 && counts.len() > 1 {
            let statistic = chi_square_uniform(counts);
            let critical = chi_square_critical((counts.len() - 1) as f64);
            if statistic > critical {
                notes.push(format!(
                    "Chi-square {statistic:.2} exceeds the 99.9% critical value {critical:.2}"
                ));
            }
            chi_square = Some(statistic);
            critical_value = Some(critical);
        }
        let expected = observed as f64 / counts.len() as f64;
        if expected < 5.0 {
            notes.push(format!(
                "Only {expected:.1} observations per cell; the chi-square check is unreliable"
            ));
        }
    }
    if violations > 0 {
        notes.push(format!("{violations} trials violated the {} contract", def.kind.label()));
    }

    let passes = violations == 0
        && match (chi_square, critical_value) {
            (Some(statistic), Some(critical)) => statistic <= critical,
            _ => true,
        };

    Ok(ScenarioReport {
        scenario: def.name.clone(),
        kind: def.kind.label().to_string(),
        seed,
        trials: def.trials,
        cells: def.kind.cells(),
        chi_square,
        critical_value,
        violations,
        passes,
        notes,
    })
}

/// Pearson statistic against an even spread of all observations.
pub fn chi_square_uniform(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&count| {
            let diff = count as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Upper 0.1% point of the chi-square distribution (Wilson–Hilferty).
pub fn chi_square_critical(dof: f64) -> f64 {
    let spread = 2.0 / (9.0 * dof);
    dof * (1.0 - spread + Z_999 * spread.sqrt()).powi(3)
}

/// Lehmer-code rank of a permutation of `0..len`, or `None` if `values` is
/// not such a permutation.
pub fn permutation_index(values: &[u32]) -> Option<usize> {
    let len = values.len();
    let mut seen = vec![false; len];
    for &value in values {
        let flag = seen.get_mut(value as usize)?;
        if *flag {
            return None;
        }
        *flag = true;
    }

    let mut index = 0;
    for (i, &value) in values.iter().enumerate() {
        let smaller_after = values[i + 1..].iter().filter(|&&later| later < value).count();
        index = index * (len - i) + smaller_after;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_index_ranks_lexicographically() {
        assert_eq!(permutation_index(&[0, 1, 2]), Some(0));
        assert_eq!(permutation_index(&[0, 2, 1]), Some(1));
        assert_eq!(permutation_index(&[1, 0, 2]), Some(2));
        assert_eq!(permutation_index(&[2, 1, 0]), Some(5));
    }

    #[test]
    fn permutation_index_rejects_non_permutations() {
        assert_eq!(permutation_index(&[0, 0, 2]), None);
        assert_eq!(permutation_index(&[0, 1, 3]), None);
    }

    #[test]
    fn critical_values_track_tables() {
        // Table values: 27.877 (dof 9), 49.728 (dof 23).
        assert!((chi_square_critical(9.0) - 27.877).abs() < 0.5);
        assert!((chi_square_critical(23.0) - 49.728).abs() < 0.5);
    }

    #[test]
    fn chi_square_of_even_counts_is_zero() {
        assert_eq!(chi_square_uniform(&[10, 10, 10, 10]), 0.0);
        assert!((chi_square_uniform(&[15, 5]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn checkpoint_scenario_never_diverges() {
        let def = ScenarioDefinition {
            name: "resume".into(),
            trials: 8,
            kind: ScenarioKind::Checkpoint { draws: 200 },
        };
        let report = run_single_scenario(&def, 77).unwrap();
        assert_eq!(report.violations, 0);
        assert!(report.passes);
        assert!(report.chi_square.is_none());
    }

    #[test]
    fn sample_scenario_has_no_violations() {
        let def = ScenarioDefinition {
            name: "pick".into(),
            trials: 500,
            kind: ScenarioKind::Sample {
                population: 6,
                choose: 6,
            },
        };
        let report = run_single_scenario(&def, 3).unwrap();
        assert_eq!(report.violations, 0);
        // Choosing every element fills every cell equally.
        assert_eq!(report.chi_square, Some(0.0));
    }
}
