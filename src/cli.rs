//! Command-line surface of `lotto-scraper`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "lotto-scraper")]
#[command(about = "Scrape Korean Lotto 6/45 draw results into a CSV dataset")]
#[command(version)]
pub struct Cli {
    /// First round to scrape
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start: u32,

    /// Last round to scrape (defaults to the newest round on the site)
    #[arg(long)]
    pub end: Option<u32>,

    /// CSV output path
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,

    /// Pause between rounds, in seconds
    #[arg(long)]
    pub delay: Option<f64>,

    /// Attempts per request
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite archive to update after a successful run
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Only fetch rounds missing from the archive
    #[arg(long, requires = "database")]
    pub skip_existing: bool,

    /// Write a JSON run report here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_to(&self, mut config: Config) -> Result<Config> {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(delay) = self.delay {
            config.request_delay = delay;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(database) = &self.database {
            config.database_path = Some(database.clone());
        }
        config.validate().context("invalid command-line override")?;
        Ok(config)
    }
}
