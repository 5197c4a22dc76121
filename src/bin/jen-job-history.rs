use std::process::ExitCode;

use jen_tools::cli::{self, HistoryCli};
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli: HistoryCli = cli::parse_args();
    info!("Starting jen-job-history");

    cli::run_until_interrupted(cli.execute()).await
}
