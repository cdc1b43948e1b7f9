use chrono::NaiveDate;
use std::fmt;

use crate::error::ValidationError;
use crate::validate;

pub const WINNING_NUMBERS_COUNT: usize = 6;
pub const MIN_NUMBER: i64 = 1;
pub const MAX_NUMBER: i64 = 45;

/// One validated lottery draw. Only constructible through [`DrawRecord::new`],
/// which enforces every invariant before the value exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    round_number: u32,
    draw_date: NaiveDate,
    winning_numbers: [u8; WINNING_NUMBERS_COUNT],
    bonus_number: u8,
    first_prize_winners: u64,
    first_prize_amount: u64,
}

impl DrawRecord {
    pub fn new(
        round_number: u32,
        draw_date: &str,
        winning_numbers: &[i64],
        bonus_number: i64,
        first_prize_winners: i64,
        first_prize_amount: i64,
    ) -> Result<Self, ValidationError> {
        validate::check_round_number(round_number)?;
        let winning = validate::check_winning_numbers(winning_numbers)?;
        let bonus = validate::check_bonus_number(bonus_number, winning_numbers)?;
        let date = validate::check_draw_date(draw_date)?;
        let (winners, amount) = validate::check_prize_fields(first_prize_winners, first_prize_amount)?;

        Ok(Self {
            round_number,
            draw_date: date,
            winning_numbers: winning,
            bonus_number: bonus,
            first_prize_winners: winners,
            first_prize_amount: amount,
        })
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_date
    }

    /// Canonical `YYYY-MM-DD` form.
    pub fn draw_date_string(&self) -> String {
        self.draw_date.format("%Y-%m-%d").to_string()
    }

    pub fn winning_numbers(&self) -> &[u8; WINNING_NUMBERS_COUNT] {
        &self.winning_numbers
    }

    pub fn bonus_number(&self) -> u8 {
        self.bonus_number
    }

    pub fn first_prize_winners(&self) -> u64 {
        self.first_prize_winners
    }

    pub fn first_prize_amount(&self) -> u64 {
        self.first_prize_amount
    }
}

/// The four data points a round page must yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WinningNumbers,
    BonusNumber,
    DrawDate,
    PrizeInfo,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::WinningNumbers => "winning numbers",
            Field::BonusNumber => "bonus number",
            Field::DrawDate => "draw date",
            Field::PrizeInfo => "first prize info",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeInfo {
    pub winners: i64,
    pub amount: i64,
}

/// Whatever the extraction strategies managed to read from one round page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    pub round_number: u32,
    pub winning_numbers: Option<Vec<i64>>,
    pub bonus_number: Option<i64>,
    pub draw_date: Option<String>,
    pub prize_info: Option<PrizeInfo>,
}

impl RawExtraction {
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            ..Default::default()
        }
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        if self.winning_numbers.is_none() {
            missing.push(Field::WinningNumbers);
        }
        if self.bonus_number.is_none() {
            missing.push(Field::BonusNumber);
        }
        if self.draw_date.is_none() {
            missing.push(Field::DrawDate);
        }
        if self.prize_info.is_none() {
            missing.push(Field::PrizeInfo);
        }
        missing
    }

    /// Promote to an [`ExtractedRound`] when every field is present.
    pub fn complete(self) -> Result<ExtractedRound, crate::error::ParseError> {
        match self {
            RawExtraction {
                round_number,
                winning_numbers: Some(winning_numbers),
                bonus_number: Some(bonus_number),
                draw_date: Some(draw_date),
                prize_info: Some(prize_info),
            } => Ok(ExtractedRound {
                round_number,
                winning_numbers,
                bonus_number,
                draw_date,
                prize_info,
            }),
            incomplete => Err(crate::error::ParseError {
                round: incomplete.round_number,
                missing: incomplete.missing_fields(),
            }),
        }
    }
}

/// A fully extracted but not yet validated round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRound {
    pub round_number: u32,
    pub winning_numbers: Vec<i64>,
    pub bonus_number: i64,
    pub draw_date: String,
    pub prize_info: PrizeInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Invariant;

    fn first_round() -> Result<DrawRecord, ValidationError> {
        DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 40], 16, 0, 0)
    }

    #[test]
    fn valid_record_keeps_values() {
        let record = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 40], 16, 4, 2_067_000_000).unwrap();

        assert_eq!(record.round_number(), 1);
        assert_eq!(record.draw_date_string(), "2002-12-07");
        assert_eq!(record.winning_numbers(), &[10, 23, 29, 33, 37, 40]);
        assert_eq!(record.bonus_number(), 16);
        assert_eq!(record.first_prize_winners(), 4);
        assert_eq!(record.first_prize_amount(), 2_067_000_000);
        assert!(first_round().is_ok());
    }

    #[test]
    fn five_winning_numbers_fail_the_length_invariant() {
        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37], 16, 4, 1).unwrap_err();
        assert_eq!(err, ValidationError::WinningCount(5));
        assert_eq!(err.invariant(), Invariant::WinningNumbers);
    }

    #[test]
    fn out_of_range_winning_number() {
        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 50], 16, 4, 1).unwrap_err();
        assert_eq!(err, ValidationError::WinningRange(50));
    }

    #[test]
    fn duplicate_winning_number() {
        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 10], 16, 4, 1).unwrap_err();
        assert_eq!(err, ValidationError::WinningDuplicate(10));
    }

    #[test]
    fn bonus_equal_to_winning_number_fails_disjointness() {
        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 40], 10, 4, 1).unwrap_err();
        assert_eq!(err, ValidationError::BonusDuplicate(10));
        assert_eq!(err.invariant(), Invariant::BonusNumber);
    }

    #[test]
    fn slash_date_fails_the_date_invariant() {
        let err = DrawRecord::new(1, "2002/12/07", &[10, 23, 29, 33, 37, 40], 16, 4, 1).unwrap_err();
        assert_eq!(err, ValidationError::DrawDate("2002/12/07".to_string()));
        assert_eq!(err.invariant(), Invariant::DrawDate);
    }

    #[test]
    fn negative_prize_fields_are_rejected() {
        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 40], 16, -1, 1).unwrap_err();
        assert_eq!(err, ValidationError::NegativeWinners(-1));

        let err = DrawRecord::new(1, "2002-12-07", &[10, 23, 29, 33, 37, 40], 16, 0, -5).unwrap_err();
        assert_eq!(err.invariant(), Invariant::PrizeFields);
    }

    #[test]
    fn incomplete_extraction_lists_missing_fields() {
        let mut raw = RawExtraction::new(7);
        raw.winning_numbers = Some(vec![1, 2, 3, 4, 5, 6]);
        raw.draw_date = Some("2002-12-07".to_string());

        let err = raw.complete().unwrap_err();
        assert_eq!(err.round, 7);
        assert_eq!(err.missing, vec![Field::BonusNumber, Field::PrizeInfo]);
    }
}
