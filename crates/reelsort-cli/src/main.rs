//! `reelsort` CLI binary: scan, detect, analyze, match, organize, and
//! run the full workflow over a directory of source videos.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;

use cli::{Cli, Command};
use error::CliError;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_format);

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Scan(args) => {
            let files = commands::scan::run(args)?;
            if cli.json {
                println!("{}", serde_json::to_string(&files)?);
            } else {
                for file in &files {
                    println!("{}", file.display());
                }
            }
            Ok(())
        }
        Command::Detect(args) => {
            let value = commands::detect::run(args).await?;
            print_json(&value)
        }
        Command::Analyze(args) => {
            let value = commands::analyze::run(args).await?;
            print_json(&value)
        }
        Command::Match(args) => {
            let value = commands::match_cmd::run(args).await?;
            print_json(&value)
        }
        Command::Organize(args) => {
            let value = commands::organize::run(args).await?;
            print_json(&value)
        }
        Command::Workflow(args) => commands::workflow::run(args, cli.json).await,
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
