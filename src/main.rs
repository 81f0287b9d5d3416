use clap::Parser;
use hike_harvest::{Harvester, Progress, Result, utils};
use std::process::ExitCode;

mod args;
use args::Args;

/// Reports progress through the log
struct LogProgress;

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        ::log::info!("Loading {} hikes", total);
    }

    fn log(&mut self, msg: &str) {
        ::log::info!("{}", msg);
    }

    fn item_done(&mut self, done: usize, total: usize) {
        ::log::info!("{} of {} hikes loaded", done, total);
    }

    fn finish(&mut self) {
        ::log::info!("Finished loading hikes");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.build_config()?;
    ::log::info!("Starting harvest for: {}", config.start_url);

    let start_time = std::time::Instant::now();
    let harvester = Harvester::new(config)?;
    let harvest = harvester.run(&mut LogProgress).await?;

    let output = args.output.unwrap_or_else(utils::default_output_path);
    utils::write_table(&harvest.table, &output)?;

    ::log::info!(
        "Harvest complete - {} index pages, {} hikes ({} omitted) in {:.2} seconds",
        harvest.index_pages.len(),
        harvest.stats.rows,
        harvest.stats.omitted,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
