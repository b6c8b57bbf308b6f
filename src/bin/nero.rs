//! Nero CLI Binary
//!
//! Command-line interface for the nero media repository engine.

use clap::Parser;
use nero::cli::{Cli, CliContext};
use nero::logging;
use std::process;

fn main() {
    let cli = Cli::parse();

    // Load configuration
    let context = match CliContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let mut logging_config = context.config().logging.clone();
    if let Some(level) = cli.log_level.clone() {
        logging_config.level = level;
    }
    if let Err(e) = logging::init_logging(&logging_config) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    // Execute command
    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
