use std::process::ExitCode;

use clap::Parser;

use cano::{run, Cli};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders help and usage errors itself; both exit non-zero.
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    match run(&cli) {
        Ok(output) => {
            for warning in &output.warnings {
                eprintln!("{}", warning);
            }
            for line in &output.reports {
                println!("{}", line);
            }
            println!(
                "Isomorphic: {}",
                if output.isomorphic { "Yes" } else { "No" }
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
