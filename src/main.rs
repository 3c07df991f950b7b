use colored::*;
use std::process::ExitCode;
use testman::cli;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
