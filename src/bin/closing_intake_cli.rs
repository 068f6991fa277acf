use std::process::ExitCode;

use clap::Parser;

use closing_intake::cli::{self, output, Cli};

fn main() -> ExitCode {
    let args = Cli::parse();
    cli::apply_output_preferences(&args);
    closing_intake::init();
    match cli::run(args) {
        Ok(code) => code,
        Err(err) => {
            output::error(format!("Error: {}", err));
            ExitCode::from(2)
        }
    }
}
