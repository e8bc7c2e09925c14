//! Interpretation of user-typed values: date phrases, tag lists, titles.

use chrono::{Days, Local, NaiveDate};

use crate::error::{Result, TodoError};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`, relative to `today`.
pub fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let phrase = input.trim().to_ascii_lowercase();
    let parsed = match phrase.as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    };
    parsed.ok_or_else(|| TodoError::InvalidDate(input.to_string()))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_from(input, today())
}

/// `clap` value parser for date arguments.
pub fn date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

/// `clap` value parser for effort arguments.
pub fn effort_arg(input: &str) -> std::result::Result<f64, String> {
    let effort: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{input}' is not a number of hours"))?;
    crate::model::validate_effort(effort).map_err(|e| e.to_string())?;
    Ok(effort)
}

/// Split `#home,#work` (or `home,work`) into tags, dropping the `#` marker
/// and empty pieces. Order and duplicates are kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim())
        .map(|t| t.strip_prefix('#').unwrap_or(t))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join title words and upper-case the first letter.
pub fn title_from_words(words: &[String]) -> String {
    let joined = words.join(" ");
    let mut chars = joined.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn relative_phrases_resolve_against_today() {
        let today = day(2024, 3, 1);
        assert_eq!(parse_date_from("today", today).unwrap(), today);
        assert_eq!(parse_date_from("Tomorrow", today).unwrap(), day(2024, 3, 2));
        assert_eq!(parse_date_from("yesterday", today).unwrap(), day(2024, 2, 29));
    }

    #[test]
    fn iso_dates_parse() {
        assert_eq!(
            parse_date_from("2024-12-31", day(2000, 1, 1)).unwrap(),
            day(2024, 12, 31)
        );
    }

    #[test]
    fn unknown_phrases_are_rejected() {
        for bad in ["nextweek", "2024-13-01", "31/12/2024", ""] {
            let err = parse_date_from(bad, day(2024, 1, 1)).unwrap_err();
            assert_eq!(err.code(), "invalid_date", "{bad}");
        }
    }

    #[test]
    fn tags_strip_markers_and_keep_order() {
        assert_eq!(parse_tags("#home,#work,home"), vec!["home", "work", "home"]);
        assert_eq!(parse_tags("a, ,#"), vec!["a"]);
    }

    #[test]
    fn effort_arg_rejects_negative_and_text() {
        assert_eq!(effort_arg("1.5").unwrap(), 1.5);
        assert!(effort_arg("-2").is_err());
        assert!(effort_arg("lots").is_err());
    }

    #[test]
    fn title_capitalizes_first_letter() {
        let words = vec!["buy".to_string(), "oat".to_string(), "milk".to_string()];
        assert_eq!(title_from_words(&words), "Buy oat milk");
        assert_eq!(title_from_words(&[]), "");
    }
}
