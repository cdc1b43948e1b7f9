//! Drives the round pipeline across a range of rounds.
//!
//! Rounds run one at a time in increasing order with a fixed pause after each
//! attempt. A failing round is recorded and the run moves on; only a raised
//! [`CancelFlag`] stops it early, and then only between rounds.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};

use crate::api::{self, Transport};
use crate::error::RoundFailure;
use crate::extract;
use crate::pipeline::RoundPipeline;
use crate::retry::{Sleeper, TokioSleeper};
use crate::types::DrawRecord;

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the flag on the first interrupt. Returns `true` once a second
    /// interrupt arrives, `false` if listening for interrupts fails.
    pub async fn watch_interrupts<F, Fut, E>(&self, mut next_interrupt: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: std::fmt::Display,
    {
        if let Err(e) = next_interrupt().await {
            warn!("cannot listen for interrupts: {}", e);
            return false;
        }
        warn!("interrupted, stopping after the current round (interrupt again to quit)");
        self.cancel();

        match next_interrupt().await {
            Ok(()) => true,
            Err(e) => {
                warn!("cannot listen for interrupts: {}", e);
                false
            }
        }
    }
}

/// Successes and failures of one run, each in round order.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub records: Vec<DrawRecord>,
    pub failures: Vec<(u32, RoundFailure)>,
    pub cancelled: bool,
}

impl ScrapeOutcome {
    pub fn failed_rounds(&self) -> Vec<u32> {
        self.failures.iter().map(|(round, _)| *round).collect()
    }
}

pub struct RangeOrchestrator<T, S = TokioSleeper> {
    pipeline: RoundPipeline<T, S>,
    sleeper: S,
    request_delay: Duration,
    fallback_latest_round: u32,
    cancel: CancelFlag,
}

impl<T: Transport, S: Sleeper> RangeOrchestrator<T, S> {
    pub fn new(
        pipeline: RoundPipeline<T, S>,
        sleeper: S,
        request_delay: Duration,
        fallback_latest_round: u32,
    ) -> Self {
        Self {
            pipeline,
            sleeper,
            request_delay,
            fallback_latest_round,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Newest round on the site. Falls back to the configured (stale) default
    /// when the page cannot be fetched or carries no round number.
    pub async fn latest_round(&self) -> u32 {
        info!("looking up latest round");
        let url = api::latest_round_url(self.pipeline.base_url());
        match self.pipeline.fetch(&url).await {
            Ok(page) => match extract::extract_latest_round_from_html(&page.body) {
                Some(round) => {
                    info!("latest round: {}", round);
                    round
                }
                None => {
                    warn!(
                        "latest round not found on page, using fallback {}",
                        self.fallback_latest_round
                    );
                    self.fallback_latest_round
                }
            },
            Err(e) => {
                warn!(
                    "latest round lookup failed ({}), using fallback {}",
                    e, self.fallback_latest_round
                );
                self.fallback_latest_round
            }
        }
    }

    pub async fn resolve_end(&self, end: Option<u32>) -> u32 {
        match end {
            Some(end) => end,
            None => self.latest_round().await,
        }
    }

    /// Every round from `start` to `end` inclusive; `None` means up to the
    /// latest round.
    pub async fn run(&self, start: u32, end: Option<u32>) -> ScrapeOutcome {
        let end = self.resolve_end(end).await;
        if start > end {
            warn!("start round {} is after end round {}, nothing to do", start, end);
            return ScrapeOutcome::default();
        }
        info!("scraping rounds {} to {}", start, end);
        self.run_ascending(start..=end).await
    }

    /// Runs the given rounds in increasing order, each at most once.
    pub async fn run_rounds(&self, rounds: impl IntoIterator<Item = u32>) -> ScrapeOutcome {
        let mut rounds: Vec<u32> = rounds.into_iter().collect();
        rounds.sort_unstable();
        rounds.dedup();
        self.run_ascending(rounds).await
    }

    /// Runs rounds as they are yielded, without collecting them first. A round
    /// not greater than the previous one is skipped.
    pub async fn run_ascending(&self, rounds: impl IntoIterator<Item = u32>) -> ScrapeOutcome {
        let mut outcome = ScrapeOutcome::default();
        let mut previous: Option<u32> = None;
        for round in rounds {
            if previous.is_some_and(|p| round <= p) {
                warn!("skipping round {}: rounds must be strictly increasing", round);
                continue;
            }
            previous = Some(round);

            if self.cancel.is_cancelled() {
                warn!("cancelled before round {}", round);
                outcome.cancelled = true;
                break;
            }

            let result = self
                .pipeline
                .run(round)
                .instrument(info_span!("round", round))
                .await;
            match result {
                Ok(record) => outcome.records.push(record),
                Err(failure) => {
                    warn!("round {} failed: {}", round, failure);
                    outcome.failures.push((round, failure));
                }
            }

            self.sleeper.sleep(self.request_delay).await;
        }

        info!(
            "scraping finished: {} succeeded, {} failed",
            outcome.records.len(),
            outcome.failures.len()
        );
        if !outcome.failures.is_empty() {
            warn!("failed rounds: {:?}", outcome.failed_rounds());
        }
        outcome
    }

    /// Drops the transport and with it the pooled connections.
    pub fn close(self) {
        drop(self.pipeline.into_transport());
        info!("scraper closed");
    }
}
