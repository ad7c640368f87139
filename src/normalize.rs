use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use tracing::warn;

use crate::error::{Result, SyncError};
use crate::models::{ColumnKind, FormattedValue};

/// Cell texts read as missing, matched exactly after trimming. Same set
/// pandas' `read_csv` treats as NA by default.
const NULL_SENTINELS: [&str; 18] = [
    "null", "NULL", "None", "NaN", "-NaN", "nan", "-nan", "NA", "<NA>", "N/A", "n/a", "#N/A",
    "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[ T].*)?$").expect("valid regex")
    })
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})(?:[ T].*)?$").expect("valid regex")
    })
}

fn named_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[-/. ]([A-Za-z]{3,9})\.?[-/. ,]+(\d{4}|\d{2})(?:[ T].*)?$")
            .expect("valid regex")
    })
}

/// Canonical comparable form of a cell: trimmed, with a missing cell and
/// any of the NA spellings (`null`, `NULL`, `N/A`, `NaN`, `None`, ...)
/// collapsing to "".
pub fn value_to_string(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None => String::new(),
        Some(v) if NULL_SENTINELS.contains(&v) => String::new(),
        Some(v) => v.to_string(),
    }
}

/// Two-digit years land within 50 years of `this_year`, the window
/// dateutil uses: with `this_year` 2026, `70` is 2070 and `76` is 1976.
fn expand_year(raw: &str, this_year: i32) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() != 2 {
        return Some(year);
    }
    let year = year + this_year / 100 * 100;
    Some(if year >= this_year + 50 {
        year - 100
    } else if year < this_year - 50 {
        year + 100
    } else {
        year
    })
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name))
        .map(|idx| idx as u32 + 1)
}

/// Parse date text, reading ambiguous numeric dates day first.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` (also `-` and `.` separators, two-digit
/// years) and Jira's `DD/Mon/YY`, each optionally followed by a time.
/// A numeric date that is impossible day-first (`01/13/2025`) is retried
/// month first.
fn parse_day_first(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();
    let fail = || SyncError::DateParse(raw.to_string());
    let this_year = Local::now().year();

    if let Some(caps) = iso_re().captures(text) {
        let year = caps[1].parse().map_err(|_| fail())?;
        let month = caps[2].parse().map_err(|_| fail())?;
        let day = caps[3].parse().map_err(|_| fail())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(fail);
    }

    if let Some(caps) = numeric_re().captures(text) {
        let first: u32 = caps[1].parse().map_err(|_| fail())?;
        let second: u32 = caps[2].parse().map_err(|_| fail())?;
        let year = expand_year(&caps[3], this_year).ok_or_else(fail)?;
        return NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
            .ok_or_else(fail);
    }

    if let Some(caps) = named_month_re().captures(text) {
        let day: u32 = caps[1].parse().map_err(|_| fail())?;
        let month = month_from_name(&caps[2]).ok_or_else(fail)?;
        let year = expand_year(&caps[3], this_year).ok_or_else(fail)?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(fail);
    }

    Err(fail())
}

/// `YYYY-MM-DD` for a parseable date, "" otherwise. Unparseable non-empty
/// input is logged and swallowed.
pub fn normalize_date(value: Option<&str>) -> String {
    let text = value_to_string(value);
    if text.is_empty() {
        return text;
    }
    match parse_day_first(&text) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(e) => {
            warn!("{e}");
            String::new()
        }
    }
}

/// Returns `(differs, normalized_source)`. Date columns compare on the
/// normalized calendar date; everything else on the trimmed text.
pub fn compare_values(source: Option<&str>, remote: Option<&str>, kind: ColumnKind) -> (bool, String) {
    let remote_str = value_to_string(remote);
    let source_str = match kind {
        ColumnKind::Date => normalize_date(source),
        _ => value_to_string(source),
    };
    (source_str != remote_str, source_str)
}

/// Shape a source value for a board write. `None` means there is nothing
/// to send (missing, empty, or `null` cell).
pub fn format_for_mutation(value: Option<&str>, kind: ColumnKind) -> Option<FormattedValue> {
    let text = value_to_string(value);
    if text.is_empty() {
        return None;
    }
    let formatted = match kind {
        ColumnKind::Date => FormattedValue::Date {
            date: normalize_date(Some(&text)),
        },
        ColumnKind::Label => FormattedValue::Label { label: text },
        ColumnKind::MultiLabel => FormattedValue::Labels {
            labels: text
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        },
        ColumnKind::Text => FormattedValue::Text(text),
    };
    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(None), "");
        assert_eq!(value_to_string(Some("null")), "");
        assert_eq!(value_to_string(Some("  null ")), "");
        assert_eq!(value_to_string(Some("")), "");
        assert_eq!(value_to_string(Some("  Open  ")), "Open");
        assert_eq!(value_to_string(Some("Null")), "Null");
    }

    #[test]
    fn test_value_to_string_idempotent() {
        for raw in ["", " x ", "null", " null", "a b ", "\tIn Progress\n", "nulll", " N/A ", "NaN"] {
            let once = value_to_string(Some(raw));
            assert_eq!(value_to_string(Some(&once)), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_normalize_date_day_first() {
        assert_eq!(normalize_date(Some("05/03/2025")), "2025-03-05");
        assert_eq!(normalize_date(Some("15-01-2025 10:30:00")), "2025-01-15");
        assert_eq!(normalize_date(Some("15.01.2025")), "2025-01-15");
        assert_eq!(normalize_date(Some("01/02/25")), "2025-02-01");
    }

    #[test]
    fn test_normalize_date_month_first_fallback() {
        assert_eq!(normalize_date(Some("01/13/2025")), "2025-01-13");
    }

    #[test]
    fn test_normalize_date_iso_and_named_months() {
        assert_eq!(normalize_date(Some("2025-01-15")), "2025-01-15");
        assert_eq!(normalize_date(Some("2025-01-15T08:00:00")), "2025-01-15");
        assert_eq!(normalize_date(Some("15/Jan/25 10:30 AM")), "2025-01-15");
        assert_eq!(normalize_date(Some("3 September 2024")), "2024-09-03");
        assert_eq!(normalize_date(Some("03-Sept-2024")), "2024-09-03");
    }

    #[test]
    fn test_normalize_date_unparseable() {
        assert_eq!(normalize_date(Some("not a date")), "");
        assert_eq!(normalize_date(Some("31/02/2025")), "");
        assert_eq!(normalize_date(Some("15/Foo/2025")), "");
        assert_eq!(normalize_date(Some("null")), "");
        assert_eq!(normalize_date(None), "");
    }

    #[test]
    fn test_normalized_date_reparses_to_same_date() {
        for raw in ["05/03/2025", "31-12-1999 23:59", "29/02/2024", "1/1/30", "12/Aug/21"] {
            let once = normalize_date(Some(raw));
            assert_eq!(once.len(), 10, "input {raw:?}");
            assert_eq!(normalize_date(Some(&once)), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_compare_values_plain() {
        assert_eq!(
            compare_values(Some(" Open "), Some("Open"), ColumnKind::Label),
            (false, "Open".to_string())
        );
        assert_eq!(
            compare_values(Some("Open"), Some("Done"), ColumnKind::Label),
            (true, "Open".to_string())
        );
        assert_eq!(compare_values(None, None, ColumnKind::Text), (false, String::new()));
        assert_eq!(compare_values(Some("null"), Some(""), ColumnKind::Text), (false, String::new()));
    }

    #[test]
    fn test_compare_values_dates_normalized() {
        assert_eq!(
            compare_values(Some("15/01/2025 09:00"), Some("2025-01-15"), ColumnKind::Date),
            (false, "2025-01-15".to_string())
        );
        assert!(compare_values(Some("16/01/2025"), Some("2025-01-15"), ColumnKind::Date).0);
    }

    #[test]
    fn test_format_for_mutation_by_kind() {
        assert_eq!(
            format_for_mutation(Some("01/02/2025"), ColumnKind::Date),
            Some(FormattedValue::Date { date: "2025-02-01".into() })
        );
        assert_eq!(
            format_for_mutation(Some(" Open "), ColumnKind::Label),
            Some(FormattedValue::Label { label: "Open".into() })
        );
        assert_eq!(
            format_for_mutation(Some("Backend, API ,,Infra"), ColumnKind::MultiLabel),
            Some(FormattedValue::Labels {
                labels: vec!["Backend".into(), "API".into(), "Infra".into()]
            })
        );
        assert_eq!(
            format_for_mutation(Some(" hello "), ColumnKind::Text),
            Some(FormattedValue::Text("hello".into()))
        );
    }

    #[test]
    fn test_format_for_mutation_tolerates_null() {
        for kind in [ColumnKind::Date, ColumnKind::Label, ColumnKind::MultiLabel, ColumnKind::Text] {
            assert_eq!(format_for_mutation(None, kind), None);
            assert_eq!(format_for_mutation(Some("null"), kind), None);
            assert_eq!(format_for_mutation(Some("   "), kind), None);
        }
    }

    #[test]
    fn test_format_for_mutation_bad_date_clears() {
        assert_eq!(
            format_for_mutation(Some("someday"), ColumnKind::Date),
            Some(FormattedValue::Date { date: String::new() })
        );
    }

    #[test]
    fn test_na_spellings_are_missing() {
        for raw in ["NULL", "N/A", "n/a", "NaN", "nan", "None", "NA", "<NA>", "#N/A", " None "] {
            assert_eq!(value_to_string(Some(raw)), "", "{raw:?}");
            assert_eq!(format_for_mutation(Some(raw), ColumnKind::Label), None);
        }
        assert_eq!(value_to_string(Some("Nonempty")), "Nonempty");
        assert_eq!(value_to_string(Some("n/a yet")), "n/a yet");
    }

    #[test]
    fn test_two_digit_years_use_fifty_year_window() {
        assert_eq!(expand_year("70", 2026), Some(2070));
        assert_eq!(expand_year("75", 2026), Some(2075));
        assert_eq!(expand_year("76", 2026), Some(1976));
        assert_eq!(expand_year("99", 2026), Some(1999));
        assert_eq!(expand_year("00", 2026), Some(2000));
        assert_eq!(expand_year("30", 2090), Some(2130));
        assert_eq!(expand_year("1970", 2026), Some(1970));
    }
}
