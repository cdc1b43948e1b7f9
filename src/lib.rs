// Lotto 6/45 draw scraper
pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod page;
pub mod pipeline;
pub mod reports;
pub mod retry;
pub mod types;
pub mod utils;
pub mod validate;

pub use api::{HttpTransport, RawHtml, Transport};
pub use config::Config;
pub use dataset::Dataset;
pub use error::{
    DatasetError, FailureKind, NetworkError, ParseError, PersistenceError, RoundFailure,
    ValidationError,
};
pub use orchestrator::{CancelFlag, RangeOrchestrator, ScrapeOutcome};
pub use pipeline::RoundPipeline;
pub use reports::{DatasetStats, RunReport};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use types::{DrawRecord, ExtractedRound, Field, PrizeInfo, RawExtraction};
