//! Route Extractor - Command-line tool for documenting Symfony routes.
//!
//! Collects routes from `@Route` docblock annotations in PHP sources and/or from a
//! `bin/console debug:router --format=json` dump, then writes an OpenAPI 2.0 document,
//! a CSV listing or a plain URL list into the output directory.
//!
//! # Usage
//!
//! ```bash
//! route-extractor [OPTIONS] --output <DIR>
//! ```
//!
//! # Examples
//!
//! Scan a project's controllers:
//! ```bash
//! route-extractor -s ./src/Controller -o ./build
//! ```
//!
//! Merge annotations with a route dump and write every format:
//! ```bash
//! route-extractor -s ./src -j routes.json -o ./build -F openapi -F openapi-yaml -F csv -F text
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_extractor::cli;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route extractor starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Route extraction finished successfully");

    Ok(())
}
