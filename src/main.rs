use std::process::ExitCode;

use quality_hook::{cli, ui::output};

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::from(2)
        }
    }
}
