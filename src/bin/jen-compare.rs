use std::process::ExitCode;

use jen_tools::cli::{self, CompareCli};
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli: CompareCli = cli::parse_args();
    info!("Starting jen-compare");

    cli::run_until_interrupted(cli.execute()).await
}
