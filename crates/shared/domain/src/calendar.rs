//! Calendar helpers: due dates, billing periods and es-MX date rendering.

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::PAYMENT_DUE_DAY;

/// Spanish month names, January first.
pub const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const SPANISH_MONTHS_SHORT: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Matches "05 de febrero de 2026" and "05 de febrero, 2026".
static SPANISH_LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}) de ([a-z]+),?(?: de)? (\d{4})$").expect("valid date pattern")
});

fn month_name(date: NaiveDate) -> &'static str {
    SPANISH_MONTHS[date.month0() as usize]
}

/// The payment due date for a resident created on `today`:
/// the 5th of the following calendar month.
pub fn next_payment_date(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, PAYMENT_DUE_DAY).unwrap_or(today)
}

/// Same day one month earlier, clamped to the end of shorter months.
pub fn previous_month(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(1)).unwrap_or(today)
}

/// Billing period label, e.g. `enero 2026`.
pub fn period_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date), date.year())
}

/// Long es-MX rendering, e.g. `05 de febrero de 2026`.
pub fn format_long(date: NaiveDate) -> String {
    format!("{:02} de {} de {}", date.day(), month_name(date), date.year())
}

/// Chat bubble timestamp in local time, e.g. `5 feb, 14:03`.
pub fn format_chat_timestamp(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    format!(
        "{} {}, {}",
        local.day(),
        SPANISH_MONTHS_SHORT[local.month0() as usize],
        local.format("%H:%M")
    )
}

/// Parse a stored or typed date.
///
/// Accepts ISO `YYYY-MM-DD` and the long Spanish forms the portal used to
/// persist before dates were normalised.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    let lowered = input.to_lowercase();
    let captures = SPANISH_LONG_DATE.captures(&lowered)?;
    let day: u32 = captures[1].parse().ok()?;
    let month = SPANISH_MONTHS.iter().position(|m| *m == &captures[2])? as u32 + 1;
    let year: i32 = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serde adapter: writes ISO dates, reads anything [`parse_date`] accepts.
pub mod payment_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_payment_date() {
        assert_eq!(next_payment_date(date(2026, 1, 20)), date(2026, 2, 5));
        assert_eq!(next_payment_date(date(2026, 1, 31)), date(2026, 2, 5));
        assert_eq!(next_payment_date(date(2026, 12, 3)), date(2027, 1, 5));
    }

    #[test]
    fn test_previous_month_clamps() {
        assert_eq!(previous_month(date(2026, 3, 31)), date(2026, 2, 28));
        assert_eq!(previous_month(date(2026, 1, 15)), date(2025, 12, 15));
    }

    #[test]
    fn test_period_label_and_long_format() {
        assert_eq!(period_label(date(2026, 1, 9)), "enero 2026");
        assert_eq!(format_long(date(2026, 2, 5)), "05 de febrero de 2026");
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("2026-02-05"), Some(date(2026, 2, 5)));
        assert_eq!(parse_date("05 de Febrero de 2026"), Some(date(2026, 2, 5)));
        assert_eq!(parse_date("5 de febrero, 2026"), Some(date(2026, 2, 5)));
        assert_eq!(parse_date("31 de febrero de 2026"), None);
        assert_eq!(parse_date("mañana"), None);
    }

    #[test]
    fn test_payment_date_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "payment_date")]
            due: NaiveDate,
        }

        let legacy: Wrapper = serde_json::from_str(r#"{"due":"05 de marzo de 2026"}"#).unwrap();
        assert_eq!(legacy.due, date(2026, 3, 5));
        assert_eq!(
            serde_json::to_string(&legacy).unwrap(),
            r#"{"due":"2026-03-05"}"#
        );
        assert!(serde_json::from_str::<Wrapper>(r#"{"due":"pronto"}"#).is_err());
    }
}
