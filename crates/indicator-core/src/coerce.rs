//! Coercion of free text into typed values.
//!
//! Every function here degrades to `None` (or an empty list) instead of failing:
//! documents are filled in by hand and a value that cannot be read is left unset.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid ISO date regex")
});
static DAY_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b").expect("Invalid day-first date regex")
});
static NAMED_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s+([A-Za-z]{3,})\.?\s+(\d{4})\b")
        .expect("Invalid named-month date regex")
});
static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://[^\s)]+").expect("Invalid URL regex"));
static YES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^y(es)?$").expect("Invalid yes regex"));
static NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^no?$").expect("Invalid no regex"));
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("Invalid leading integer regex"));

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

/// Month number (1-12) for a full English month name or its three-letter
/// abbreviation (plus "sept"), case-insensitive.
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|month| *month == name || (name.len() == 3 && month.starts_with(&name)))
        .or_else(|| (name == "sept").then_some(8))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn parse_u32(text: &str) -> Option<u32> {
    text.parse().ok()
}

fn parse_i32(text: &str) -> Option<i32> {
    text.parse().ok()
}

/// Find the first calendar date in free text.
///
/// Patterns are tried in order: `YYYY-MM-DD`, then `DD/MM/YYYY` or `DD-MM-YYYY`,
/// then `D Month YYYY`. Within a pattern, matches that do not form a real date
/// (e.g. `31/02/2024`) are skipped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use indicator_core::coerce::find_date;
///
/// assert_eq!(find_date("Published on 8 March 2024"), NaiveDate::from_ymd_opt(2024, 3, 8));
/// assert_eq!(find_date("15/07/2024"), NaiveDate::from_ymd_opt(2024, 7, 15));
/// assert_eq!(find_date("no date here"), None);
/// ```
#[must_use]
pub fn find_date(text: &str) -> Option<NaiveDate> {
    let iso = ISO_DATE.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(parse_i32(&caps[1])?, parse_u32(&caps[2])?, parse_u32(&caps[3])?)
    });
    if iso.is_some() {
        return iso;
    }

    let day_first = DAY_FIRST_DATE.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(parse_i32(&caps[3])?, parse_u32(&caps[2])?, parse_u32(&caps[1])?)
    });
    if day_first.is_some() {
        return day_first;
    }

    NAMED_MONTH_DATE.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(
            parse_i32(&caps[3])?,
            month_number(&caps[2])?,
            parse_u32(&caps[1])?,
        )
    })
}

/// First `http://` or `https://` token in free text.
///
/// The token runs until whitespace or a closing parenthesis.
#[must_use]
pub fn find_url(text: &str) -> Option<String> {
    HTTP_URL.find(text).map(|m| m.as_str().to_string())
}

/// Split delimited free text on commas, semicolons and newlines.
///
/// Segments are trimmed; empty segments are discarded.
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the leading integer of a string, the way a lenient number parser does.
///
/// `"2019"` and `"2019 onwards"` both give `2019`; `"about 2019"` gives `None`.
#[must_use]
pub fn parse_leading_int(text: &str) -> Option<i32> {
    LEADING_INT
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether a token reads as "yes" / "y".
#[inline]
#[must_use]
pub fn is_yes(text: &str) -> bool {
    YES.is_match(text.trim())
}

/// Whether a token reads as "no" / "n".
#[inline]
#[must_use]
pub fn is_no(text: &str) -> bool {
    NO.is_match(text.trim())
}

/// Coerce checked options of a yes/no group into a flag.
///
/// Empty ⇒ unset. A "yes" anywhere wins, then a "no"; any other non-empty
/// selection counts as present and reads as `true`.
#[must_use]
pub fn bool_from_list<S: AsRef<str>>(values: &[S]) -> Option<bool> {
    if values.is_empty() {
        return None;
    }
    if values.iter().any(|v| is_yes(v.as_ref())) {
        return Some(true);
    }
    if values.iter().any(|v| is_no(v.as_ref())) {
        return Some(false);
    }
    Some(true)
}

/// Coerce a single text value into a flag.
///
/// "yes" ⇒ `true`, "no" ⇒ `false`, other non-empty text ⇒ `true`, empty ⇒ unset.
#[must_use]
pub fn bool_from_text(text: &str) -> Option<bool> {
    if is_yes(text) {
        Some(true)
    } else if is_no(text) {
        Some(false)
    } else if text.is_empty() {
        None
    } else {
        Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_find_date_iso() {
        assert_eq!(find_date("released 2024-07-15."), date(2024, 7, 15));
        assert_eq!(find_date("2024-7-5"), date(2024, 7, 5));
    }

    #[test]
    fn test_find_date_day_first() {
        assert_eq!(find_date("on 15/07/2024"), date(2024, 7, 15));
        assert_eq!(find_date("on 01-02-2023"), date(2023, 2, 1));
    }

    #[test]
    fn test_find_date_named_month() {
        assert_eq!(find_date("Published on 8 March 2024 at x"), date(2024, 3, 8));
        assert_eq!(find_date("08 mar 2024"), date(2024, 3, 8));
        assert_eq!(find_date("3 SEPTEMBER 2021"), date(2021, 9, 3));
        assert_eq!(find_date("3 Sept 2021"), date(2021, 9, 3));
    }

    #[test]
    fn test_find_date_skips_impossible_dates() {
        assert_eq!(find_date("31/02/2024"), None);
        assert_eq!(find_date("2024-13-01 or 2 May 2020"), date(2020, 5, 2));
        assert_eq!(find_date("8 Marchember 2024"), None);
    }

    #[test]
    fn test_find_date_pattern_priority() {
        // ISO wins even when a day-first date appears earlier.
        assert_eq!(find_date("01/01/2020 then 2021-06-30"), date(2021, 6, 30));
    }

    #[test]
    fn test_find_url() {
        assert_eq!(
            find_url("Published on 8 March 2024 at https://example.org/report"),
            Some("https://example.org/report".to_string())
        );
        assert_eq!(
            find_url("(see HTTP://Example.org/a)"),
            Some("HTTP://Example.org/a".to_string())
        );
        assert_eq!(find_url("www.example.org"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("Kenya, Uganda;Tanzania\n\n Rwanda ,"),
            vec!["Kenya", "Uganda", "Tanzania", "Rwanda"]
        );
        assert!(split_list(" , ;\n").is_empty());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("2019"), Some(2019));
        assert_eq!(parse_leading_int(" 2019 onwards"), Some(2019));
        assert_eq!(parse_leading_int("about 2019"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_bool_from_list() {
        assert_eq!(bool_from_list(&["Yes"]), Some(true));
        assert_eq!(bool_from_list(&["No"]), Some(false));
        assert_eq!(bool_from_list(&["Maybe"]), Some(true));
        assert_eq!(bool_from_list::<&str>(&[]), None);
        assert_eq!(bool_from_list(&["n", "Y"]), Some(true));
    }

    #[test]
    fn test_bool_from_text() {
        assert_eq!(bool_from_text("y"), Some(true));
        assert_eq!(bool_from_text("NO"), Some(false));
        assert_eq!(bool_from_text("sometimes"), Some(true));
        assert_eq!(bool_from_text(""), None);
    }
}
