//! Shared field-formatting module.
//!
//! Every handler and form-facing serializer goes through these functions, so
//! the masked display forms (`MM/DD/YYYY` dates, `(XXX) XXX-XXXX` phones) and
//! the stored forms (ISO dates, bare digit strings) stay losslessly
//! convertible in both directions.

use chrono::NaiveDate;

/// Calendar years accepted from form input.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Parse a date from form input.
///
/// Accepts the `MM/DD/YYYY` display mask or ISO `YYYY-MM-DD`. Returns `None`
/// for anything out of range (month 1–12, day 1–31, year 1900–2100) or not a
/// real calendar date (Feb 30, Apr 31).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Some(date) = parse_display_date(input) {
        return Some(date);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    in_year_range(date).then_some(date)
}

fn parse_display_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !(1..=12).contains(&month)
        || !(1..=31).contains(&day)
        || !(MIN_YEAR..=MAX_YEAR).contains(&year)
    {
        return None;
    }
    // from_ymd_opt rejects dates that passed the range check but do not
    // exist on the calendar (02/30, 04/31, non-leap 02/29).
    NaiveDate::from_ymd_opt(year, month, day)
}

fn in_year_range(date: NaiveDate) -> bool {
    use chrono::Datelike;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

/// Render a stored date in the `MM/DD/YYYY` display mask, zero-padded.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Strip everything except ASCII digits. This is the stored phone form.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Render digits in the `(XXX) XXX-XXXX` display mask.
///
/// Shorter inputs get a truncated mask; digits beyond the tenth are ignored.
/// Stripping non-digits from the output recovers the first ten input digits.
pub fn format_phone(raw: &str) -> String {
    let digits = normalize_phone(raw);
    let digits = &digits[..digits.len().min(10)];
    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({digits}"),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Parse a time-of-day field, normalizing to 24-hour `HH:MM`.
///
/// Accepts `HH:MM` or `HH:MM AM/PM` (any case on the meridiem).
pub fn parse_time(input: &str) -> Option<String> {
    use chrono::NaiveTime;
    let input = input.trim();
    let time = NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&input.to_uppercase(), "%I:%M %p"))
        .ok()?;
    Some(time.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_date_round_trips() {
        for s in ["01/01/1900", "02/29/2024", "12/31/2100", "07/04/1976", "10/09/2023"] {
            let date = parse_date(s).unwrap_or_else(|| panic!("{s} should parse"));
            assert_eq!(format_date(date), s);
        }
    }

    #[test]
    fn iso_dates_accepted() {
        let date = parse_date("2024-02-29").unwrap();
        assert_eq!(format_date(date), "02/29/2024");
    }

    #[test]
    fn invalid_dates_rejected() {
        for s in [
            "02/30/2024", // not on the calendar
            "02/29/2023", // not a leap year
            "13/01/2020",
            "00/15/2020",
            "06/00/2020",
            "06/32/2020",
            "04/31/2021",
            "01/01/1899",
            "01/01/2101",
            "1899-12-31",
            "2101-01-01",
            "01/01",
            "01/01/2020/05",
            "1/x/2020",
            "not a date",
            "",
        ] {
            assert!(parse_date(s).is_none(), "{s} should be rejected");
        }
    }

    #[test]
    fn unpadded_display_input_normalizes() {
        let date = parse_date("1/5/2024").unwrap();
        assert_eq!(format_date(date), "01/05/2024");
    }

    #[test]
    fn normalize_phone_strips_mask() {
        assert_eq!(normalize_phone("(616) 555-0142"), "6165550142");
        assert_eq!(normalize_phone("616.555.0142"), "6165550142");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn format_phone_full_number() {
        assert_eq!(format_phone("6165550142"), "(616) 555-0142");
    }

    #[test]
    fn format_phone_truncates_partial_input() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("6"), "(6");
        assert_eq!(format_phone("616"), "(616");
        assert_eq!(format_phone("6165"), "(616) 5");
        assert_eq!(format_phone("616555"), "(616) 555");
        assert_eq!(format_phone("6165550"), "(616) 555-0");
    }

    #[test]
    fn format_phone_round_trips_digits() {
        let mut digits = String::new();
        for d in ["6", "1", "6", "5", "5", "5", "0", "1", "4", "2"] {
            digits.push_str(d);
            assert_eq!(normalize_phone(&format_phone(&digits)), digits);
        }
    }

    #[test]
    fn format_phone_ignores_digits_past_ten() {
        assert_eq!(format_phone("61655501429999"), "(616) 555-0142");
    }

    #[test]
    fn format_phone_accepts_already_masked_input() {
        assert_eq!(format_phone("(616) 555-0142"), "(616) 555-0142");
    }

    #[test]
    fn parse_time_24_hour() {
        assert_eq!(parse_time("09:30").as_deref(), Some("09:30"));
        assert_eq!(parse_time("23:05").as_deref(), Some("23:05"));
    }

    #[test]
    fn parse_time_meridiem() {
        assert_eq!(parse_time("9:30 AM").as_deref(), Some("09:30"));
        assert_eq!(parse_time("12:15 pm").as_deref(), Some("12:15"));
        assert_eq!(parse_time("12:15 am").as_deref(), Some("00:15"));
    }

    #[test]
    fn parse_time_rejects_garbage() {
        for s in ["25:00", "10:75", "soon", ""] {
            assert!(parse_time(s).is_none(), "{s} should be rejected");
        }
    }
}
