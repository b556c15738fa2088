use std::process;

use clap::Parser;
use tracing::{dispatcher, error, info};

use postcode_scraper::cli::CliArgs;
use postcode_scraper::pos::{MockPosClient, PosClient};
use postcode_scraper::scan::{ScanError, Scanner};
use postcode_scraper::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    if let Err(e) = telemetry::init(args.quiet) {
        eprintln!("Warning: {e}");
    }

    if let Err(error) = run(args).await {
        report_error(&error);
        process::exit(1);
    }
}

fn report_error(error: &ScanError) {
    if dispatcher::has_been_set() {
        error!("{error}");
    } else {
        eprintln!("Error: {error}");
    }
}

async fn run(args: CliArgs) -> Result<(), ScanError> {
    let config = args.scan_config()?;

    let report = match &args.mock_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving responses from mock data");
            Scanner::new(MockPosClient::from_dir(dir)?, config)
                .run()
                .await?
        }
        None => {
            Scanner::new(PosClient::new(args.client_config())?, config)
                .run()
                .await?
        }
    };

    info!(path = %report.output.display(), "wrote export");
    Ok(())
}
