use clap::Parser;

use heic_batch_rs::cli::{self, Cli};
use heic_batch_rs::logger::{self, error, info};

fn main() {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    info!("Starting heic-batch...");
    info!("Target format: {}", cli.format);
    info!(
        "Input: {} ({})",
        cli.input.display(),
        if cli.recursive { "recursive" } else { "top level only" }
    );

    match cli::run(&cli) {
        Ok(summary) => info!("Done, {} file(s) converted", summary.converted),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
