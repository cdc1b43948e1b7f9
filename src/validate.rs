//! Domain rules for a single draw. Pure functions, no I/O.
//!
//! Checks run in a fixed order and stop at the first violation: round number,
//! winning numbers (count, range, uniqueness), bonus number (range,
//! disjointness), draw date, prize fields.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{DrawRecord, ExtractedRound, MAX_NUMBER, MIN_NUMBER, WINNING_NUMBERS_COUNT};

pub fn validate(round: &ExtractedRound) -> Result<DrawRecord, ValidationError> {
    DrawRecord::new(
        round.round_number,
        &round.draw_date,
        &round.winning_numbers,
        round.bonus_number,
        round.prize_info.winners,
        round.prize_info.amount,
    )
}

pub fn validate_winning_numbers(numbers: &[i64]) -> bool {
    check_winning_numbers(numbers).is_ok()
}

pub fn validate_bonus_number(bonus: i64, winning_numbers: &[i64]) -> bool {
    check_bonus_number(bonus, winning_numbers).is_ok()
}

fn in_range(n: i64) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&n)
}

pub fn check_round_number(round: u32) -> Result<(), ValidationError> {
    if round == 0 {
        return Err(ValidationError::RoundNumber(round));
    }
    Ok(())
}

pub fn check_winning_numbers(numbers: &[i64]) -> Result<[u8; WINNING_NUMBERS_COUNT], ValidationError> {
    if numbers.len() != WINNING_NUMBERS_COUNT {
        return Err(ValidationError::WinningCount(numbers.len()));
    }
    if let Some(&n) = numbers.iter().find(|&&n| !in_range(n)) {
        return Err(ValidationError::WinningRange(n));
    }

    let mut seen = HashSet::with_capacity(WINNING_NUMBERS_COUNT);
    let mut out = [0u8; WINNING_NUMBERS_COUNT];
    for (slot, &n) in out.iter_mut().zip(numbers) {
        if !seen.insert(n) {
            return Err(ValidationError::WinningDuplicate(n));
        }
        // range checked above
        *slot = n as u8;
    }
    Ok(out)
}

pub fn check_bonus_number(bonus: i64, winning_numbers: &[i64]) -> Result<u8, ValidationError> {
    if !in_range(bonus) {
        return Err(ValidationError::BonusRange(bonus));
    }
    if winning_numbers.contains(&bonus) {
        return Err(ValidationError::BonusDuplicate(bonus));
    }
    Ok(bonus as u8)
}

/// Accepts only the canonical zero-padded form of a real calendar date.
pub fn check_draw_date(date: &str) -> Result<NaiveDate, ValidationError> {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == date => Ok(parsed),
        _ => Err(ValidationError::DrawDate(date.to_string())),
    }
}

pub fn check_prize_fields(winners: i64, amount: i64) -> Result<(u64, u64), ValidationError> {
    let winners = u64::try_from(winners).map_err(|_| ValidationError::NegativeWinners(winners))?;
    let amount = u64::try_from(amount).map_err(|_| ValidationError::NegativeAmount(amount))?;
    Ok((winners, amount))
}
