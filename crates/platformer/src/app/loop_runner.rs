use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        scene,
        mut input,
    } = app;
    match run_app(config, scene, &mut input) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                stop_reason = ?summary.stop_reason,
                script_exhausted = input.is_exhausted(),
                "run_complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
