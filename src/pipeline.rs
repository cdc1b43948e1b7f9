use tracing::{debug, info};

use crate::api::{self, RawHtml, Transport};
use crate::error::{NetworkError, RoundFailure};
use crate::extract;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::types::DrawRecord;
use crate::validate;

/// Fetch -> parse -> extract -> validate for one round.
pub struct RoundPipeline<T, S = TokioSleeper> {
    transport: T,
    retry: RetryPolicy<S>,
    base_url: String,
}

impl<T: Transport, S: Sleeper> RoundPipeline<T, S> {
    pub fn new(transport: T, retry: RetryPolicy<S>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            retry,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// GET with the retry policy applied.
    pub async fn fetch(&self, url: &str) -> Result<RawHtml, NetworkError> {
        self.retry.execute(|| self.transport.fetch(url)).await
    }

    pub async fn run(&self, round: u32) -> Result<DrawRecord, RoundFailure> {
        let url = api::round_url(&self.base_url, round);
        let page = self.fetch(&url).await?;
        if page.final_url != url {
            debug!("round {} served from {}", round, page.final_url);
        }

        let extracted = extract::extract_from_html(&page.body, round).complete()?;
        let record = validate::validate(&extracted)?;
        info!(
            "round {} ok: {} {:?} + {}",
            round,
            record.draw_date_string(),
            record.winning_numbers(),
            record.bonus_number()
        );
        Ok(record)
    }
}
