use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(\d{4})\.(\d{1,2})\.(\d{1,2})").expect("dotted date pattern"),
        Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("dashed date pattern"),
        Regex::new(r"(\d{4})/(\d{1,2})/(\d{1,2})").expect("slashed date pattern"),
    ]
});

/// Strip every non-digit character and parse what is left.
///
/// Text without digits (or too many to fit) yields 0, so callers never have to
/// handle a parse error; the weaker value is rejected by validation instead.
pub fn clean_number_string(text: &str) -> i64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Normalize a `YYYY.M.D`, `YYYY-M-D` or `YYYY/M/D` date found anywhere in
/// `date_str` to zero-padded `YYYY-MM-DD`. Unrecognized input is returned as-is.
pub fn normalize_date(date_str: &str) -> String {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(date_str) {
            return format_date_parts(&caps[1], &caps[2], &caps[3]);
        }
    }
    date_str.to_string()
}

pub fn format_date_parts(year: &str, month: &str, day: &str) -> String {
    format!("{}-{:0>2}-{:0>2}", year, month, day)
}

/// `1234567` -> `1,234,567`
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
