//! The output table: records sorted by round, one CSV row each.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{DatasetError, PersistenceError};
use crate::types::DrawRecord;

pub const CSV_COLUMNS: [&str; 11] = [
    "round_number",
    "draw_date",
    "winning_number_1",
    "winning_number_2",
    "winning_number_3",
    "winning_number_4",
    "winning_number_5",
    "winning_number_6",
    "bonus_number",
    "first_prize_winners",
    "first_prize_amount",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<DrawRecord>,
}

impl Dataset {
    /// Sorts by round number and rejects duplicate rounds.
    pub fn from_records(mut records: Vec<DrawRecord>) -> Result<Self, DatasetError> {
        records.sort_by_key(DrawRecord::round_number);
        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].round_number() == pair[1].round_number())
        {
            return Err(DatasetError::DuplicateRound(pair[0].round_number()));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Post-hoc check before anything is written. Order and uniqueness are
    /// already guaranteed by [`Dataset::from_records`].
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(())
    }

    pub fn write_csv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "{}", CSV_COLUMNS.join(","))?;
        for record in &self.records {
            writeln!(out, "{}", csv_row(record))?;
        }
        out.flush()
    }

    /// Writes the CSV to `path`, creating parent directories.
    pub fn save_csv(&self, path: &Path) -> Result<PathBuf, PersistenceError> {
        let io_err = |source: std::io::Error| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        self.write_csv(BufWriter::new(file)).map_err(io_err)?;

        info!("saved {} rows to {}", self.records.len(), path.display());
        Ok(path.to_path_buf())
    }
}

fn csv_row(record: &DrawRecord) -> String {
    let mut fields = Vec::with_capacity(CSV_COLUMNS.len());
    fields.push(record.round_number().to_string());
    fields.push(record.draw_date_string());
    fields.extend(record.winning_numbers().iter().map(|n| n.to_string()));
    fields.push(record.bonus_number().to_string());
    fields.push(record.first_prize_winners().to_string());
    fields.push(record.first_prize_amount().to_string());
    fields.join(",")
}
