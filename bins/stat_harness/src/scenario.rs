use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{AppError, AppResult};

const MAX_SHUFFLE_LENGTH: u32 = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(default)]
    pub trials: u32,
    #[serde(flatten)]
    pub kind: ScenarioKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioKind {
    Uniform { bound: u32 },
    Real { buckets: u32 },
    Sample { population: u32, choose: u32 },
    Shuffle { length: u32 },
    Checkpoint { draws: u32 },
}

impl ScenarioKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Uniform { .. } => "uniform",
            ScenarioKind::Real { .. } => "real",
            ScenarioKind::Sample { .. } => "sample",
            ScenarioKind::Shuffle { .. } => "shuffle",
            ScenarioKind::Checkpoint { .. } => "checkpoint",
        }
    }

    /// Number of histogram cells the scenario fills, if it runs a chi-square check.
    pub fn cells(&self) -> Option<usize> {
        match *self {
            ScenarioKind::Uniform { bound } => Some(bound as usize),
            ScenarioKind::Real { buckets } => Some(buckets as usize),
            ScenarioKind::Sample { population, .. } => Some(population as usize),
            ScenarioKind::Shuffle { length } => Some(factorial(length)),
            ScenarioKind::Checkpoint { .. } => None,
        }
    }
}

impl HarnessConfig {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| AppError::Message(format!("failed to read harness config {path:?}: {err}")))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|err| AppError::Message(format!("invalid harness config JSON: {err}")))?;
        config.normalise()?;
        Ok(config)
    }

    pub fn builtin() -> Self {
        let mut config = Self {
            seed: default_seed(),
            scenarios: default_scenarios(),
        };
        let _ = config.normalise();
        config
    }

    pub fn normalise(&mut self) -> AppResult<()> {
        if self.scenarios.is_empty() {
            self.scenarios = default_scenarios();
        }

        for scenario in &mut self.scenarios {
            scenario.ensure_defaults()?;
        }

        Ok(())
    }
}

impl ScenarioDefinition {
    pub fn ensure_defaults(&mut self) -> AppResult<()> {
        if self.trials == 0 {
            self.trials = default_trials(&self.kind);
        }

        match self.kind {
            ScenarioKind::Uniform { bound } if bound < 2 => Err(AppError::Message(format!(
                "scenario '{}' must declare bound >= 2",
                self.name
            ))),
            ScenarioKind::Real { buckets } if buckets < 2 => Err(AppError::Message(format!(
                "scenario '{}' must declare buckets >= 2",
                self.name
            ))),
            ScenarioKind::Sample { population, choose } if population < 2 || choose == 0 || choose > population => {
                Err(AppError::Message(format!(
                    "scenario '{}' must choose between 1 and {population} of at least 2 elements (got {choose})",
                    self.name
                )))
            }
            ScenarioKind::Shuffle { length } if !(2..=MAX_SHUFFLE_LENGTH).contains(&length) => {
                Err(AppError::Message(format!(
                    "scenario '{}' must shuffle between 2 and {MAX_SHUFFLE_LENGTH} elements",
                    self.name
                )))
            }
            ScenarioKind::Checkpoint { draws } if draws == 0 => Err(AppError::Message(format!(
                "scenario '{}' must compare at least one draw",
                self.name
            ))),
            _ => Ok(()),
        }
    }
}

pub fn factorial(n: u32) -> usize {
    (1..=n as usize).product()
}

fn default_seed() -> u64 {
    0x5EED_CAFE_u64
}

/// Enough trials for roughly a thousand observations per histogram cell.
fn default_trials(kind: &ScenarioKind) -> u32 {
    match *kind {
        ScenarioKind::Sample { population, choose } => {
            (1_000u32.saturating_mul(population) / choose.max(1)).max(1)
        }
        ScenarioKind::Checkpoint { .. } => 16,
        _ => kind
            .cells()
            .map(|cells| (cells as u32).saturating_mul(1_000))
            .unwrap_or(1_000),
    }
}

fn default_scenarios() -> Vec<ScenarioDefinition> {
    vec![
        ScenarioDefinition {
            name: "uniform_d6".to_string(),
            trials: 60_000,
            kind: ScenarioKind::Uniform { bound: 6 },
        },
        ScenarioDefinition {
            name: "uniform_odd_1000".to_string(),
            trials: 200_000,
            kind: ScenarioKind::Uniform { bound: 1_000 },
        },
        ScenarioDefinition {
            name: "real_deciles".to_string(),
            trials: 50_000,
            kind: ScenarioKind::Real { buckets: 10 },
        },
        ScenarioDefinition {
            name: "sample_3_of_10".to_string(),
            trials: 20_000,
            kind: ScenarioKind::Sample {
                population: 10,
                choose: 3,
            },
        },
        ScenarioDefinition {
            name: "shuffle_4".to_string(),
            trials: 24_000,
            kind: ScenarioKind::Shuffle { length: 4 },
        },
        ScenarioDefinition {
            name: "checkpoint_resume".to_string(),
            trials: 16,
            kind: ScenarioKind::Checkpoint { draws: 1_000 },
        },
    ]
}
