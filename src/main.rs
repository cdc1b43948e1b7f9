use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use lotto_lib::cli::Cli;
use lotto_lib::orchestrator::{CancelFlag, RangeOrchestrator};
use lotto_lib::pipeline::RoundPipeline;
use lotto_lib::reports::{DatasetStats, RunReport};
use lotto_lib::retry::{RetryPolicy, TokioSleeper};
use lotto_lib::{Dataset, HttpTransport, config, database};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = cli.apply_to(config::load(cli.config.as_deref())?)?;
    tracing::info!("starting lotto scrape");
    tracing::info!("start round: {}", cli.start);
    match cli.end {
        Some(end) => tracing::info!("end round: {}", end),
        None => tracing::info!("end round: latest"),
    }
    tracing::info!("output file: {}", config.output_path.display());

    let transport = HttpTransport::from_config(&config).context("building HTTP client")?;
    let retry = RetryPolicy::new(config.max_retries, config.retry_base_delay());
    let pipeline = RoundPipeline::new(transport, retry, config.base_url.clone());

    let cancel = CancelFlag::new();
    let orchestrator = RangeOrchestrator::new(
        pipeline,
        TokioSleeper,
        config.request_delay(),
        config.fallback_latest_round,
    )
    .with_cancel_flag(cancel.clone());

    tokio::spawn(async move {
        if cancel.watch_interrupts(tokio::signal::ctrl_c).await {
            tracing::error!("interrupted twice, exiting without saving");
            std::process::exit(130);
        }
    });

    let archive = match &config.database_path {
        Some(path) => {
            let conn = database::open_archive(path)
                .with_context(|| format!("opening archive {}", path.display()))?;
            match database::latest_stored_round(&conn)? {
                Some(round) => tracing::info!("archive holds rounds up to {}", round),
                None => tracing::info!("archive is empty"),
            }
            Some(conn)
        }
        None => None,
    };

    let (outcome, stored) = match (&archive, cli.skip_existing) {
        (Some(conn), true) => {
            let end = orchestrator.resolve_end(cli.end).await;
            let split = database::check_existing_rounds(conn, cli.start, end)?;
            tracing::info!(
                "{} rounds already archived, {} to fetch",
                split.existing().len(),
                split.to_fetch_count()
            );
            let stored = database::load_draw_records(conn, cli.start, end)?;
            (orchestrator.run_ascending(split.to_fetch()).await, stored)
        }
        _ => (orchestrator.run(cli.start, cli.end).await, Vec::new()),
    };
    orchestrator.close();

    let fetched = outcome.records.len();
    let mut all_records = stored;
    all_records.extend(outcome.records.iter().cloned());

    let dataset = Dataset::from_records(all_records).context("assembling dataset")?;
    if let Some(path) = &cli.report {
        RunReport::from_outcome(&dataset, &outcome).save_json(path)?;
    }
    if outcome.cancelled {
        tracing::warn!("run was cancelled; writing the rounds collected so far");
    }
    if dataset.is_empty() {
        bail!("no draw records were collected");
    }
    dataset.validate().context("dataset failed validation")?;

    let saved = dataset.save_csv(&config.output_path)?;
    if let Some(conn) = &archive {
        database::save_draw_records(conn, dataset.records())?;
    }
    if let Some(stats) = DatasetStats::from_dataset(&dataset) {
        stats.print_statistics();
    }

    println!("\n✅ Scraping finished");
    println!("📁 Saved file: {}", saved.display());
    println!(
        "📊 {} rounds ({} fetched this run, {} failed)",
        dataset.len(),
        fetched,
        outcome.failures.len()
    );

    Ok(())
}
