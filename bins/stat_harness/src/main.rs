use std::path::PathBuf;

use clap::{Parser, ValueHint};
use reprand::Random;
use tracing::info;

use stat_harness::report::HarnessSummary;
use stat_harness::scenario::HarnessConfig;
use stat_harness::state_file::{load_state, save_state};

#[derive(Debug, Parser)]
#[command(name = "stat-harness", about = "Statistical checks for the reprand generator")]
struct Cli {
    /// Optional path to a scenario configuration file (JSON).
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Path to write the JSON summary report.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Path to write a Markdown summary report.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    markdown: Option<PathBuf>,

    /// Override the master seed used to derive scenario seeds.
    #[arg(long, value_name = "SEED", conflicts_with = "state_in")]
    seed: Option<u64>,

    /// Resume the master generator from a saved state file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    state_in: Option<PathBuf>,

    /// Save the master generator's final state for a later `--state-in`.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    state_out: Option<PathBuf>,

    /// Print the Markdown summary to stdout instead of the textual table.
    #[arg(long)]
    print_markdown: bool,
}

fn main() -> shared::AppResult<()> {
    shared::init_tracing()?;

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut master = match cli.state_in.as_ref() {
        Some(path) => {
            let master = load_state(path)?;
            info!(path = ?path, seed = master.seed(), steps = master.steps(), "resumed master generator");
            config.seed = master.seed();
            master
        }
        None => Random::new(config.seed),
    };

    let summary = stat_harness::run_harness(&config, &mut master)?;

    if let Some(path) = cli.state_out.as_ref() {
        save_state(path, &master)?;
        info!(path = ?path, steps = master.steps(), "saved master generator state");
    }

    if let Some(path) = cli.output.as_ref() {
        summary.write_json(path)?;
        info!(path = ?path, "wrote JSON summary");
    }

    if let Some(path) = cli.markdown.as_ref() {
        summary.write_markdown(path)?;
        info!(path = ?path, "wrote Markdown summary");
    }

    if cli.print_markdown {
        println!("{}", summary.render_markdown());
    } else {
        print_console_table(&summary);
    }

    if summary.passes {
        Ok(())
    } else {
        Err(shared::AppError::Message("one or more scenarios failed".into()))
    }
}

fn load_config(path: Option<&PathBuf>) -> shared::AppResult<HarnessConfig> {
    if let Some(path) = path {
        HarnessConfig::from_path(path)
    } else {
        let default_path = PathBuf::from("benchmarks/scenarios.json");
        if default_path.exists() {
            HarnessConfig::from_path(&default_path)
        } else {
            Ok(HarnessConfig::builtin())
        }
    }
}

fn print_console_table(summary: &HarnessSummary) {
    println!(
        "Master seed: {} | Scenarios: {} | Pass: {}",
        summary.seed,
        summary.reports.len(),
        if summary.passes { "yes" } else { "no" }
    );

    println!(
        "{:<24} {:<10} {:>20} {:>8} {:>8} {:>12} {:>10} {:>6} {:>6}",
        "Scenario", "Kind", "Seed", "Trials", "Cells", "Chi-square", "Critical", "Viol", "Pass"
    );
    println!("{}", "-".repeat(112));

    for report in &summary.reports {
        println!(
            "{:<24} {:<10} {:>20} {:>8} {:>8} {:>12} {:>10} {:>6} {:>6}",
            truncate(&report.scenario, 24),
            report.kind,
            report.seed,
            report.trials,
            report.cells.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
            report.chi_square.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into()),
            report.critical_value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into()),
            report.violations,
            if report.passes { "✅" } else { "❌" }
        );
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.len() <= width {
        value.to_string()
    } else if width <= 3 {
        "…".repeat(width)
    } else {
        let mut truncated = value.chars().take(width - 1).collect::<String>();
        truncated.push('…');
        truncated
    }
}
