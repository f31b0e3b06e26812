use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Accepts the date formats the frontend historically sent and
/// canonicalizes to ISO `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> anyhow::Result<NaiveDate> {
    let trimmed = input.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    anyhow::bail!("Unrecognized date: {}", input)
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"))
}

pub fn is_valid_time(input: &str) -> bool {
    time_re().is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_input_formats_canonicalize() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(parse_date("2026-03-05").unwrap(), expected);
        assert_eq!(parse_date("05/03/2026").unwrap(), expected);
        assert_eq!(parse_date("05-03-2026").unwrap(), expected);
    }

    #[test]
    fn garbage_dates_are_rejected()  {
        assert!(parse_date("03/2026").is_err());
        assert!(parse_date("not a date").is_err());
        assert!(parse_date("2026-13-40").is_err());
    }

    #[test]
    fn time_strings() {
        assert!(is_valid_time("09:30"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("9:30"));
        assert!(!is_valid_time("09:60"));
    }
}
