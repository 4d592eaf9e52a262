use std::process::ExitCode;
use clap::Parser;
use tracing::{debug, Level};
use rsafile::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match (cli.silent, cli.verbose) {
        (true, _) => Level::WARN,
        (_, true) => Level::DEBUG,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!("Run args: {:?}", cli);
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
