use std::process::ExitCode;

mod bootstrap;
mod gameplay;
mod loop_runner;
mod script;

pub(crate) fn main() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            tracing::error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
