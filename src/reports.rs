use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{FailureKind, PersistenceError};
use crate::orchestrator::ScrapeOutcome;
use crate::utils::format_amount;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_rounds: usize,
    pub first_round: u32,
    pub last_round: u32,
    pub first_date: String,
    pub last_date: String,
    pub mean_first_prize_winners: f64,
    pub mean_first_prize_amount: f64,
    pub max_first_prize_amount: u64,
    pub min_first_prize_amount: u64,
}

impl DatasetStats {
    /// `None` for an empty dataset.
    pub fn from_dataset(dataset: &Dataset) -> Option<Self> {
        let records = dataset.records();
        let (first, last) = (records.first()?, records.last()?);
        let count = records.len() as f64;

        let total_winners: u64 = records.iter().map(|r| r.first_prize_winners()).sum();
        let total_amount: f64 = records.iter().map(|r| r.first_prize_amount() as f64).sum();
        let amounts = records.iter().map(|r| r.first_prize_amount());

        Some(Self {
            total_rounds: records.len(),
            first_round: first.round_number(),
            last_round: last.round_number(),
            first_date: first.draw_date_string(),
            last_date: last.draw_date_string(),
            mean_first_prize_winners: total_winners as f64 / count,
            mean_first_prize_amount: total_amount / count,
            max_first_prize_amount: amounts.clone().max().unwrap_or(0),
            min_first_prize_amount: amounts.min().unwrap_or(0),
        })
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("총 회차수: {}회", format_amount(self.total_rounds as u64)),
            format!("회차 범위: {}회 ~ {}회", self.first_round, self.last_round),
            format!("날짜 범위: {} ~ {}", self.first_date, self.last_date),
            format!("평균 1등 당첨자수: {:.1}명", self.mean_first_prize_winners),
            format!(
                "평균 1등 당첨금액: {}원",
                format_amount(self.mean_first_prize_amount as u64)
            ),
            format!("최대 1등 당첨금액: {}원", format_amount(self.max_first_prize_amount)),
            format!("최소 1등 당첨금액: {}원", format_amount(self.min_first_prize_amount)),
        ]
    }

    pub fn print_statistics(&self) {
        println!("\n{}", "=".repeat(50));
        println!("📊 로또 데이터 통계");
        println!("{}", "=".repeat(50));
        for line in self.summary_lines() {
            println!("{}", line);
        }
        println!("{}", "=".repeat(50));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub round: u32,
    pub kind: FailureKind,
    pub message: String,
}

/// Machine-readable summary of one run, written with `--report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub stats: Option<DatasetStats>,
    pub failures: Vec<FailureEntry>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn from_outcome(dataset: &Dataset, outcome: &ScrapeOutcome) -> Self {
        Self {
            stats: DatasetStats::from_dataset(dataset),
            failures: outcome
                .failures
                .iter()
                .map(|(round, failure)| FailureEntry {
                    round: *round,
                    kind: failure.kind(),
                    message: failure.to_string(),
                })
                .collect(),
            cancelled: outcome.cancelled,
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("run report written to {}", path.display());
        Ok(())
    }
}
