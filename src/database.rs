use rusqlite::{Connection, OptionalExtension, Result, params};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::PersistenceError;
use crate::types::DrawRecord;

pub fn open_archive(path: &Path) -> Result<Connection, PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS draws (
            round_number INTEGER PRIMARY KEY,
            draw_date TEXT NOT NULL,
            winning_number_1 INTEGER NOT NULL,
            winning_number_2 INTEGER NOT NULL,
            winning_number_3 INTEGER NOT NULL,
            winning_number_4 INTEGER NOT NULL,
            winning_number_5 INTEGER NOT NULL,
            winning_number_6 INTEGER NOT NULL,
            bonus_number INTEGER NOT NULL,
            first_prize_winners INTEGER NOT NULL,
            first_prize_amount INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

pub fn save_draw_record(conn: &Connection, record: &DrawRecord) -> Result<()> {
    let n = record.winning_numbers();
    conn.execute(
        "INSERT OR REPLACE INTO draws (
            round_number, draw_date,
            winning_number_1, winning_number_2, winning_number_3,
            winning_number_4, winning_number_5, winning_number_6,
            bonus_number, first_prize_winners, first_prize_amount
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.round_number(),
            record.draw_date_string(),
            n[0],
            n[1],
            n[2],
            n[3],
            n[4],
            n[5],
            record.bonus_number(),
            record.first_prize_winners() as i64,
            record.first_prize_amount() as i64,
        ],
    )?;
    Ok(())
}

/// Upserts all records in one transaction.
pub fn save_draw_records(conn: &Connection, records: &[DrawRecord]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for record in records {
        save_draw_record(&tx, record)?;
    }
    tx.commit()?;
    info!("archived {} draws", records.len());
    Ok(())
}

/// A round range split into rounds already archived and rounds still to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSplit {
    start: u32,
    end: u32,
    existing: BTreeSet<u32>,
}

impl RoundSplit {
    pub fn existing(&self) -> &BTreeSet<u32> {
        &self.existing
    }

    /// Missing rounds in increasing order, generated lazily.
    pub fn to_fetch(&self) -> impl Iterator<Item = u32> + '_ {
        (self.start..=self.end).filter(|round| !self.existing.contains(round))
    }

    pub fn to_fetch_count(&self) -> u64 {
        if self.start > self.end {
            return 0;
        }
        u64::from(self.end - self.start) + 1 - self.existing.len() as u64
    }
}

pub fn check_existing_rounds(conn: &Connection, start: u32, end: u32) -> Result<RoundSplit> {
    let mut stmt = conn.prepare("SELECT round_number FROM draws WHERE round_number BETWEEN ?1 AND ?2")?;
    let existing = stmt
        .query_map([start, end], |row| row.get::<_, u32>(0))?
        .collect::<Result<BTreeSet<u32>>>()?;
    Ok(RoundSplit { start, end, existing })
}

pub fn latest_stored_round(conn: &Connection) -> Result<Option<u32>> {
    conn.query_row("SELECT MAX(round_number) FROM draws", [], |row| {
        row.get::<_, Option<u32>>(0)
    })
    .optional()
    .map(Option::flatten)
}

/// Loads `start..=end` in round order. Each row goes back through
/// [`DrawRecord::new`], so a tampered archive surfaces as `Corrupt`.
pub fn load_draw_records(conn: &Connection, start: u32, end: u32) -> Result<Vec<DrawRecord>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT round_number, draw_date,
                winning_number_1, winning_number_2, winning_number_3,
                winning_number_4, winning_number_5, winning_number_6,
                bonus_number, first_prize_winners, first_prize_amount
         FROM draws
         WHERE round_number BETWEEN ?1 AND ?2
         ORDER BY round_number",
    )?;
    let rows = stmt.query_map([start, end], |row| {
        let round: u32 = row.get(0)?;
        let date: String = row.get(1)?;
        let winning = [
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, i64>(7)?,
        ];
        let bonus: i64 = row.get(8)?;
        let winners: i64 = row.get(9)?;
        let amount: i64 = row.get(10)?;
        Ok((round, date, winning, bonus, winners, amount))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (round, date, winning, bonus, winners, amount) = row?;
        let record = DrawRecord::new(round, &date, &winning, bonus, winners, amount)
            .map_err(|source| PersistenceError::Corrupt { round, source })?;
        records.push(record);
    }
    Ok(records)
}
