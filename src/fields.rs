//! Small helpers behind the non-chip form widgets: multiselect shims, the
//! date-range picker, the overflow counter and the submit spinner.

use crate::DateError;
use chrono::{NaiveDate, NaiveTime, SecondsFormat};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value for the hidden field shadowing a native `<select multiple>`.
pub fn join_selected<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .filter(|v| !v.as_ref().is_empty())
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a `YYYY-MM-DD` input value. Blank input is no date.
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, DateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DateError::Invalid(trimmed.to_string()))
}

/// UTC midnight of `date` in the form the search handler expects,
/// e.g. `2024-03-01T00:00:00.000Z`.
pub fn iso_midnight(date: NaiveDate) -> String {
    date.and_time(NaiveTime::default())
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => Self {
                start: Some(e),
                end: Some(s),
            },
            _ => Self { start, end },
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn start_iso(&self) -> Option<String> {
        self.start.map(iso_midnight)
    }

    pub fn end_iso(&self) -> Option<String> {
        self.end.map(iso_midnight)
    }
}

/// Layout measurements of one rendered chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipMetrics {
    pub offset_top: i32,
    pub offset_height: i32,
}

/// Chips that wrapped past `row_limit` rows.
pub fn overflowing_chips_count(chips: &[ChipMetrics], row_limit: i32) -> usize {
    chips
        .iter()
        .filter(|c| c.offset_top > c.offset_height * row_limit)
        .count()
}

pub fn overflow_label(count: usize) -> String {
    if count > 0 {
        format!("+{count}")
    } else {
        String::new()
    }
}

/// Class list of the spinner icon put into a submitting button.
pub fn spinner_class_name(positive_button: bool) -> String {
    let mut class = String::from("p-icon--spinner u-animation--spin");
    if positive_button {
        class.push_str(" is-light");
    }
    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_skips_blank_options() {
        assert_eq!(join_selected(["pdf", "", "png"]), "pdf,png");
        assert_eq!(join_selected(Vec::<String>::new()), "");
    }

    #[test]
    fn reversed_range_is_swapped() {
        let range = DateRange::parse("2024-03-10", "2024-03-01").unwrap();
        assert_eq!(range.start_iso().as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(range.end_iso().as_deref(), Some("2024-03-10T00:00:00.000Z"));
    }

    #[test]
    fn open_ended_ranges_are_kept() {
        let range = DateRange::parse("", "2024-01-31").unwrap();
        assert_eq!(range.start, None);
        assert_eq!(range.end_iso().as_deref(), Some("2024-01-31T00:00:00.000Z"));
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert_eq!(
            parse_date("31/01/2024"),
            Err(DateError::Invalid("31/01/2024".to_string()))
        );
    }

    #[test]
    fn counts_chips_below_the_first_row() {
        let chips = [
            ChipMetrics { offset_top: 0, offset_height: 32 },
            ChipMetrics { offset_top: 32, offset_height: 32 },
            ChipMetrics { offset_top: 64, offset_height: 32 },
            ChipMetrics { offset_top: 96, offset_height: 32 },
        ];
        assert_eq!(overflowing_chips_count(&chips, 1), 2);
        assert_eq!(overflow_label(2), "+2");
        assert_eq!(overflow_label(0), "");
    }

    #[test]
    fn positive_buttons_get_a_light_spinner() {
        assert_eq!(spinner_class_name(false), "p-icon--spinner u-animation--spin");
        assert_eq!(
            spinner_class_name(true),
            "p-icon--spinner u-animation--spin is-light"
        );
    }
}
