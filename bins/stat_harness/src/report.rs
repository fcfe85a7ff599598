use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use shared::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub kind: String,
    pub seed: u64,
    pub trials: u32,
    pub cells: Option<usize>,
    pub chi_square: Option<f64>,
    pub critical_value: Option<f64>,
    pub violations: u64,
    pub passes: bool,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessSummary {
    pub seed: u64,
    pub generated_at: String,
    pub passes: bool,
    pub final_state: String,
    pub reports: Vec<ScenarioReport>,
}

impl HarnessSummary {
    pub fn write_json(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Message(format!("failed to serialise harness summary: {err}")))?;
        fs::create_dir_all(path.parent().unwrap_or_else(|| Path::new(".")))
            .map_err(|err| AppError::Message(format!("failed to create directory for {path:?}: {err}")))?;
        fs::write(path, json)
            .map_err(|err| AppError::Message(format!("failed to write harness summary {path:?}: {err}")))
    }

    pub fn write_markdown(&self, path: &Path) -> AppResult<()> {
        let markdown = self.render_markdown();
        fs::create_dir_all(path.parent().unwrap_or_else(|| Path::new(".")))
            .map_err(|err| AppError::Message(format!("failed to create directory for {path:?}: {err}")))?;
        fs::write(path, markdown)
            .map_err(|err| AppError::Message(format!("failed to write markdown summary {path:?}: {err}")))
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Generator statistics summary\n\n");
        out.push_str(&format!("- Generated: {}\n", self.generated_at));
        out.push_str(&format!("- Master seed: {}\n", self.seed));
        out.push_str(&format!("- Final master state: `{}`\n", self.final_state));
        out.push_str(&format!("- Pass status: {}\n\n", if self.passes { "PASS" } else { "FAIL" }));

        out.push_str("| Scenario | Kind | Seed | Trials | Cells | Chi-square | Critical | Violations | Pass |\n");
        out.push_str("|---|---|---|---|---|---|---|---|---|\n");
        for report in &self.reports {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
                report.scenario,
                report.kind,
                report.seed,
                report.trials,
                optional(report.cells.map(|c| c.to_string())),
                optional(report.chi_square.map(|v| format!("{v:.2}"))),
                optional(report.critical_value.map(|v| format!("{v:.2}"))),
                report.violations,
                if report.passes { "✅" } else { "❌" }
            ));
        }

        for report in &self.reports {
            if report.notes.is_empty() {
                continue;
            }
            out.push_str(&format!("\n## {} [{}]\n\n", report.scenario, report.kind));
            for note in &report.notes {
                out.push_str(&format!("- {}\n", note));
            }
        }

        out
    }
}

pub fn build_summary(seed: u64, final_state: String, reports: Vec<ScenarioReport>) -> HarnessSummary {
    let passes = reports.iter().all(|report| report.passes);
    HarnessSummary {
        seed,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        passes,
        final_state,
        reports,
    }
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, passes: bool) -> ScenarioReport {
        ScenarioReport {
            scenario: name.to_string(),
            kind: "uniform".to_string(),
            seed: 1,
            trials: 100,
            cells: Some(4),
            chi_square: Some(2.5),
            critical_value: Some(16.27),
            violations: 0,
            passes,
            notes: if passes { Vec::new() } else { vec!["chi-square above critical value".into()] },
        }
    }

    #[test]
    fn summary_fails_when_any_scenario_fails() {
        let summary = build_summary(9, "state".into(), vec![report("a", true), report("b", false)]);
        assert!(!summary.passes);
        let summary = build_summary(9, "state".into(), vec![report("a", true)]);
        assert!(summary.passes);
    }

    #[test]
    fn markdown_lists_every_scenario_and_notes() {
        let summary = build_summary(9, "random-v1 9 1 1 0 endrandom-v1".into(), vec![report("a", true), report("b", false)]);
        let markdown = summary.render_markdown();
        assert!(markdown.contains("| a | uniform | 1 | 100 | 4 | 2.50 | 16.27 | 0 | ✅ |"));
        assert!(markdown.contains("## b [uniform]"));
        assert!(markdown.contains("Pass status: FAIL"));
        assert!(markdown.contains("`random-v1 9 1 1 0 endrandom-v1`"));
    }
}
