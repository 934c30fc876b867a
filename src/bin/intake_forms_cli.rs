use std::process::ExitCode;

use intake_forms::cli::{output, run_cli};

fn main() -> ExitCode {
    intake_forms::init();
    match run_cli(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            ExitCode::FAILURE
        }
    }
}
