use serde::Serialize;
use std::path::PathBuf;

use crate::types::Field;

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
}

/// Extraction came back incomplete after every fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("round {round}: no usable {}", join_fields(.missing))]
pub struct ParseError {
    pub round: u32,
    pub missing: Vec<Field>,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    RoundNumber,
    WinningNumbers,
    BonusNumber,
    DrawDate,
    PrizeFields,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("round number must be positive, got {0}")]
    RoundNumber(u32),

    #[error("expected 6 winning numbers, got {0}")]
    WinningCount(usize),

    #[error("winning number {0} is outside 1..=45")]
    WinningRange(i64),

    #[error("winning number {0} appears more than once")]
    WinningDuplicate(i64),

    #[error("bonus number {0} is outside 1..=45")]
    BonusRange(i64),

    #[error("bonus number {0} is also a winning number")]
    BonusDuplicate(i64),

    #[error("draw date {0:?} is not a YYYY-MM-DD calendar date")]
    DrawDate(String),

    #[error("first prize winners must be non-negative, got {0}")]
    NegativeWinners(i64),

    #[error("first prize amount must be non-negative, got {0}")]
    NegativeAmount(i64),
}

impl ValidationError {
    pub fn invariant(&self) -> Invariant {
        match self {
            ValidationError::RoundNumber(_) => Invariant::RoundNumber,
            ValidationError::WinningCount(_)
            | ValidationError::WinningRange(_)
            | ValidationError::WinningDuplicate(_) => Invariant::WinningNumbers,
            ValidationError::BonusRange(_) | ValidationError::BonusDuplicate(_) => {
                Invariant::BonusNumber
            }
            ValidationError::DrawDate(_) => Invariant::DrawDate,
            ValidationError::NegativeWinners(_) | ValidationError::NegativeAmount(_) => {
                Invariant::PrizeFields
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Parsing,
    Validation,
}

/// Why a single round could not be produced. Never escapes the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum RoundFailure {
    #[error("network failure: {0}")]
    Network(#[from] NetworkError),

    #[error("parsing failure: {0}")]
    Parsing(#[from] ParseError),

    #[error("validation failure: {0}")]
    Validation(#[from] ValidationError),
}

impl RoundFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            RoundFailure::Network(_) => FailureKind::Network,
            RoundFailure::Parsing(_) => FailureKind::Parsing,
            RoundFailure::Validation(_) => FailureKind::Validation,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored round {round} is invalid: {source}")]
    Corrupt {
        round: u32,
        source: ValidationError,
    },
}

/// Post-hoc checks on an assembled dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset is empty")]
    Empty,

    #[error("round {0} appears more than once")]
    DuplicateRound(u32),
}
