pub mod report;
pub mod scenario;
pub mod simulation;
pub mod state_file;

use reprand::Random;
use report::HarnessSummary;
use scenario::HarnessConfig;
use shared::AppResult;
use simulation::run_all_scenarios;

pub fn run_harness(config: &HarnessConfig, master: &mut Random) -> AppResult<HarnessSummary> {
    run_all_scenarios(config, master)
}
