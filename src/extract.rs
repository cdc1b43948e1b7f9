//! Field extraction strategies for a round page.
//!
//! Each field has a primary method and one or more fallbacks, tried in order.
//! A strategy never errors: it either yields a value or `None`, and a `None`
//! after the last fallback makes the round incomplete.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::page::{HtmlPage, PageNode, RoundPage};
use crate::types::{Field, MAX_NUMBER, MIN_NUMBER, PrizeInfo, RawExtraction, WINNING_NUMBERS_COUNT};
use crate::utils::{clean_number_string, format_date_parts, normalize_date};

const WINNING_CONTAINER: &str = "div.num.win";
const BONUS_CONTAINER: &str = "div.num.bonus";
const BALL: &str = "span.ball_645";
const PRIZE_TABLE: &str = "table.tbl_data";
const ROUND_SELECT_OPTIONS: &str = "select#dwrNoList option";
const FIRST_PRIZE_LABEL: &str = "1등";

static META_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}\.\d{1,2}\.\d{1,2}").expect("meta date pattern"));
static LOOSE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}[-./]\d{1,2}[-./]\d{1,2}").expect("loose date pattern"));
static CAPTION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일").expect("caption date pattern")
});
static META_NUMBERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"당첨번호\s*(\d{1,2}(?:\s*,\s*\d{1,2}){5})\s*\+\s*(\d{1,2})")
        .expect("meta numbers pattern")
});
static META_PRIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"1등\s*총\s*(\d+)명.*?(\d{1,3}(?:,\d{3})*)원").expect("meta prize pattern")
});
static META_ROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)회").expect("meta round pattern"));

fn attempt<T>(field: Field, method: &str, run: impl FnOnce() -> Option<T>) -> Option<T> {
    let value = run();
    if value.is_some() {
        debug!("{} extracted via {}", field, method);
    } else {
        debug!("{} not found via {}", field, method);
    }
    value
}

/// Ball text through the shared numeric cleanup; anything outside 1..=45
/// (including garbage, which cleans to 0) counts as no value.
fn parse_ball(text: &str) -> Option<i64> {
    let n = clean_number_string(text);
    (MIN_NUMBER..=MAX_NUMBER).contains(&n).then_some(n)
}

pub fn extract_round<P: RoundPage>(page: &P, round: u32) -> RawExtraction {
    let raw = RawExtraction {
        round_number: round,
        winning_numbers: extract_winning_numbers(page),
        bonus_number: extract_bonus_number(page),
        draw_date: extract_draw_date(page),
        prize_info: extract_prize_info(page),
    };

    let missing = raw.missing_fields();
    if !missing.is_empty() {
        warn!("round {}: nothing usable for {:?}", round, missing);
    }
    raw
}

/// Parses `html` and runs every strategy. The parsed document is dropped
/// before returning.
pub fn extract_from_html(html: &str, round: u32) -> RawExtraction {
    extract_round(&HtmlPage::parse(html), round)
}

pub fn extract_winning_numbers<P: RoundPage>(page: &P) -> Option<Vec<i64>> {
    attempt(Field::WinningNumbers, "ball container", || winning_numbers_from_balls(page))
        .or_else(|| {
            attempt(Field::WinningNumbers, "page description", || {
                numbers_from_meta(page).map(|(winning, _)| winning)
            })
        })
}

fn winning_numbers_from_balls<P: RoundPage>(page: &P) -> Option<Vec<i64>> {
    let container = page.find_first(WINNING_CONTAINER)?;
    let numbers: Vec<i64> = container
        .find_all(BALL)
        .iter()
        .filter_map(|ball| parse_ball(&ball.text()))
        .collect();

    if numbers.len() == WINNING_NUMBERS_COUNT {
        Some(numbers)
    } else {
        debug!("expected 6 winning balls, read {}", numbers.len());
        None
    }
}

pub fn extract_bonus_number<P: RoundPage>(page: &P) -> Option<i64> {
    attempt(Field::BonusNumber, "bonus container", || {
        let container = page.find_first(BONUS_CONTAINER)?;
        parse_ball(&container.find_first(BALL)?.text())
    })
    .or_else(|| {
        attempt(Field::BonusNumber, "page description", || {
            numbers_from_meta(page).map(|(_, bonus)| bonus)
        })
    })
}

/// `... 당첨번호 8,9,18,35,39,45+25 ...` in the page description.
fn numbers_from_meta<P: RoundPage>(page: &P) -> Option<(Vec<i64>, i64)> {
    let caps = META_NUMBERS.captures(page.meta_description()?)?;
    let winning: Vec<i64> = caps[1].split(',').filter_map(parse_ball).collect();
    let bonus = parse_ball(&caps[2])?;
    (winning.len() == WINNING_NUMBERS_COUNT).then_some((winning, bonus))
}

pub fn extract_draw_date<P: RoundPage>(page: &P) -> Option<String> {
    attempt(Field::DrawDate, "page description", || {
        let found = META_DATE.find(page.meta_description()?)?;
        Some(normalize_date(found.as_str()))
    })
    .or_else(|| {
        // first match in document order wins
        attempt(Field::DrawDate, "text scan", || {
            let node = page.text_nodes().into_iter().find(|t| LOOSE_DATE.is_match(t))?;
            Some(normalize_date(node.trim()))
        })
    })
    .or_else(|| {
        attempt(Field::DrawDate, "draw caption", || {
            page.text_nodes().into_iter().find_map(|t| {
                CAPTION_DATE
                    .captures(t)
                    .map(|caps| format_date_parts(&caps[1], &caps[2], &caps[3]))
            })
        })
    })
}

pub fn extract_prize_info<P: RoundPage>(page: &P) -> Option<PrizeInfo> {
    attempt(Field::PrizeInfo, "results table", || prize_info_from_table(page)).or_else(|| {
        attempt(Field::PrizeInfo, "page description", || {
            let caps = META_PRIZE.captures(page.meta_description()?)?;
            Some(PrizeInfo {
                winners: clean_number_string(&caps[1]),
                amount: clean_number_string(&caps[2]),
            })
        })
    })
}

fn prize_info_from_table<P: RoundPage>(page: &P) -> Option<PrizeInfo> {
    let table = page.find_first(PRIZE_TABLE)?;
    table.find_all("tr").into_iter().find_map(|row| {
        let cells = row.find_all("td");
        if cells.len() >= 4 && cells[0].text() == FIRST_PRIZE_LABEL {
            Some(PrizeInfo {
                winners: clean_number_string(&cells[2].text()),
                amount: clean_number_string(&cells[3].text()),
            })
        } else {
            None
        }
    })
}

/// Newest round advertised by the page: the first entry of the round
/// selector, else `N회` in the page description.
pub fn extract_latest_round<P: RoundPage>(page: &P) -> Option<u32> {
    let from_select = page
        .find_first(ROUND_SELECT_OPTIONS)
        .and_then(|option| option.attr("value"))
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&round| round > 0);
    if let Some(round) = from_select {
        debug!("latest round {} read from round selector", round);
        return Some(round);
    }

    let caps = META_ROUND.captures(page.meta_description()?)?;
    let round = caps[1].parse::<u32>().ok().filter(|&round| round > 0)?;
    debug!("latest round {} read from page description", round);
    Some(round)
}

pub fn extract_latest_round_from_html(html: &str) -> Option<u32> {
    extract_latest_round(&HtmlPage::parse(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_1150: &str = include_str!("../tests/fixtures/round_1150.html");

    fn page(body: &str) -> HtmlPage {
        HtmlPage::parse(&format!("<html><head></head><body>{}</body></html>", body))
    }

    fn page_with_meta(content: &str, body: &str) -> HtmlPage {
        HtmlPage::parse(&format!(
            r#"<html><head><meta name="description" content="{}"></head><body>{}</body></html>"#,
            content, body
        ))
    }

    #[test]
    fn full_round_page_extracts_every_field() {
        let raw = extract_from_html(ROUND_1150, 1150);

        assert_eq!(raw.round_number, 1150);
        assert_eq!(raw.winning_numbers, Some(vec![8, 9, 18, 35, 39, 45]));
        assert_eq!(raw.bonus_number, Some(25));
        assert_eq!(raw.draw_date.as_deref(), Some("2024-12-14"));
        assert_eq!(
            raw.prize_info,
            Some(PrizeInfo {
                winners: 9,
                amount: 3_065_034_000
            })
        );
        assert!(raw.missing_fields().is_empty());
    }

    #[test]
    fn five_balls_reject_the_whole_set() {
        let page = page(
            r#"<div class="num win"><p>
                <span class="ball_645">1</span><span class="ball_645">2</span>
                <span class="ball_645">3</span><span class="ball_645">4</span>
                <span class="ball_645">5</span>
            </p></div>"#,
        );
        assert_eq!(extract_winning_numbers(&page), None);
    }

    #[test]
    fn garbage_ball_text_shrinks_the_set() {
        let page = page(
            r#"<div class="num win"><p>
                <span class="ball_645">1</span><span class="ball_645">2</span>
                <span class="ball_645">3</span><span class="ball_645">4</span>
                <span class="ball_645">5</span><span class="ball_645">?</span>
            </p></div>"#,
        );
        assert_eq!(extract_winning_numbers(&page), None);
    }

    #[test]
    fn numbers_fall_back_to_the_description() {
        let page = page_with_meta("동행복권 1회 당첨번호 10,23,29,33,37,40+16. 1등 총 0명", "");
        assert_eq!(extract_winning_numbers(&page), Some(vec![10, 23, 29, 33, 37, 40]));
        assert_eq!(extract_bonus_number(&page), Some(16));
    }

    #[test]
    fn out_of_range_bonus_is_no_value() {
        let page = page(r#"<div class="num bonus"><p><span class="ball_645">46</span></p></div>"#);
        assert_eq!(extract_bonus_number(&page), None);
    }

    #[test]
    fn draw_date_prefers_the_description() {
        let page = page_with_meta("제1회 2002.12.7 추첨", "<p>2010-01-01</p>");
        assert_eq!(extract_draw_date(&page).as_deref(), Some("2002-12-07"));
    }

    #[test]
    fn draw_date_text_scan_takes_the_first_match() {
        let page = page("<p>발표 2024/3/9</p><p>2023.01.01</p>");
        assert_eq!(extract_draw_date(&page).as_deref(), Some("2024-03-09"));
    }

    #[test]
    fn mixed_separators_pass_through_unnormalized() {
        let page = page("<p>2024.12/19</p>");
        assert_eq!(extract_draw_date(&page).as_deref(), Some("2024.12/19"));
    }

    #[test]
    fn draw_date_missing_everywhere() {
        let page = page("<p>no date here</p>");
        assert_eq!(extract_draw_date(&page), None);
    }

    #[test]
    fn prize_info_falls_back_to_the_description() {
        let page = page_with_meta(
            "동행복권 1149회 당첨번호 1,2,3,4,5,6+7. 1등 총 28명, 1인당 당첨금액 985,155,349원.",
            r#"<table class="tbl_data"><tr><td>2등</td><td>x</td><td>1</td><td>2</td></tr></table>"#,
        );
        assert_eq!(
            extract_prize_info(&page),
            Some(PrizeInfo {
                winners: 28,
                amount: 985_155_349
            })
        );
    }

    #[test]
    fn prize_table_cells_are_cleaned() {
        let page = page(
            r#"<table class="tbl_data"><tr><td> 1등 </td><td>x</td><td>1,204명</td><td>없음</td></tr></table>"#,
        );
        assert_eq!(
            extract_prize_info(&page),
            Some(PrizeInfo {
                winners: 1204,
                amount: 0
            })
        );
    }

    #[test]
    fn latest_round_from_selector_then_description() {
        assert_eq!(extract_latest_round_from_html(ROUND_1150), Some(1150));

        let described = page_with_meta("동행복권 1201회 당첨번호", r#"<select id="dwrNoList"></select>"#);
        assert_eq!(extract_latest_round(&described), Some(1201));

        let unparsable = page_with_meta(
            "동행복권 1202회 당첨번호",
            r#"<select id="dwrNoList"><option value="최신">최신</option><option value="1201">1201</option></select>"#,
        );
        assert_eq!(extract_latest_round(&unparsable), Some(1202));

        let blank = page("<p>maintenance</p>");
        assert_eq!(extract_latest_round(&blank), None);
    }

    #[test]
    fn incomplete_page_reports_missing_fields() {
        let raw = extract_from_html("<html><body><p>점검 중</p></body></html>", 9);
        assert_eq!(raw.missing_fields().len(), 4);
    }
}
