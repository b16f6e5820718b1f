//! Date/time detection and canonical rendering.
//!
//! Cells are checked in priority order:
//!
//! 1. Numbers strictly between [`SERIAL_MIN`] and [`SERIAL_MAX`] are spreadsheet
//!    date serials (whole part = days since 1899-12-30, fraction = time of day).
//! 2. Date/times the reader already decoded.
//! 3. Trimmed text matching, in order: `<day> <month-name> <year>[ HH:MM[:SS]]`,
//!    `HH:MM[:SS]`, one of the numeric date shapes, or a numeric date shape
//!    followed by a time of day.
//!
//! Everything else is left untouched. Output uses `YYYY-MM-DD`,
//! `YYYY-MM-DD HH:MM:SS`, or `HH:MM:SS`, with no timezone conversion.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use thiserror::Error;

use sheetline_model::{CellValue, TemporalKind};

use crate::months::month_from_name;

/// Exclusive lower bound for numeric date serials.
pub const SERIAL_MIN: f64 = 1.0;
/// Exclusive upper bound for numeric date serials (9999-12-31 is 2,958,465).
pub const SERIAL_MAX: f64 = 2_958_466.0;

const SECONDS_PER_DAY: i64 = 86_400;

static NAMED_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]+\.?)\s+(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("Invalid named-month regex")
});

static TIME_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("Invalid time regex")
});

/// Numeric date shapes, in match order.
const DATE_SHAPES: &[(&str, DateLayout)] = &[
    (r"(\d{4})-(\d{1,2})-(\d{1,2})", DateLayout::YearFirst),
    (r"(\d{1,2})/(\d{1,2})/(\d{4})", DateLayout::YearLast),
    (r"(\d{1,2})-(\d{1,2})-(\d{4})", DateLayout::YearLast),
    (r"(\d{1,2})\.(\d{1,2})\.(\d{4})", DateLayout::YearLast),
    (r"(\d{4})/(\d{1,2})/(\d{1,2})", DateLayout::YearFirst),
];

const TIME_SUFFIX: &str = r"\s+(\d{1,2}):(\d{2})(?::(\d{2}))?";

static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    DATE_SHAPES
        .iter()
        .map(|(shape, layout)| DatePattern {
            date_only: Regex::new(&format!("^{shape}$")).expect("Invalid date regex"),
            with_time: Regex::new(&format!("^{shape}{TIME_SUFFIX}$"))
                .expect("Invalid datetime regex"),
            layout: *layout,
        })
        .collect()
});

struct DatePattern {
    date_only: Regex,
    with_time: Regex,
    layout: DateLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateLayout {
    /// `YYYY-M-D`, `YYYY/M/D`
    YearFirst,
    /// `M/D/YYYY`, `M-D-YYYY`, `D.M.YYYY`; day and month order is ambiguous.
    YearLast,
}

/// Options for temporal detection.
#[derive(Debug, Clone, Copy)]
pub struct TemporalOptions {
    /// Treat numbers in the serial range as spreadsheet dates.
    pub serial_dates: bool,
}

impl Default for TemporalOptions {
    fn default() -> Self {
        Self { serial_dates: true }
    }
}

impl TemporalOptions {
    #[must_use]
    pub fn with_serial_dates(mut self, enabled: bool) -> Self {
        self.serial_dates = enabled;
        self
    }
}

/// Errors raised while converting a value already recognized as temporal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemporalError {
    #[error("date serial {serial} is outside the supported calendar range")]
    SerialOutOfRange { serial: f64 },

    #[error("no calendar date for year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("no calendar date for {first}/{second}/{year} in month-day or day-month order")]
    NoDayMonthOrder { first: u32, second: u32, year: i32 },

    #[error("invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },
}

/// Result of temporal conversion for one value.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalOutcome {
    /// The value is temporal and was rendered canonically.
    Converted { kind: TemporalKind, text: String },
    /// The value is not temporal; keep it as is.
    Unchanged,
    /// The value looked temporal but could not be converted; keep it as is.
    Failed(TemporalError),
}

impl TemporalOutcome {
    pub fn kind(&self) -> TemporalKind {
        match self {
            Self::Converted { kind, .. } => *kind,
            Self::Unchanged | Self::Failed(_) => TemporalKind::None,
        }
    }
}

/// Day/month order tried for year-last dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
}

impl DateOrder {
    fn build(self, first: u32, second: u32, year: i32) -> Option<NaiveDate> {
        match self {
            Self::MonthDayYear => NaiveDate::from_ymd_opt(year, first, second),
            Self::DayMonthYear => NaiveDate::from_ymd_opt(year, second, first),
        }
    }
}

/// Orders to try for a year-last date whose first part is `first`.
///
/// A first part above 12 can only be a day. Otherwise month-first is tried
/// before day-first, so `03/04/2024` resolves to March 4.
pub fn date_attempts(first: u32) -> &'static [DateOrder] {
    if first > 12 {
        &[DateOrder::DayMonthYear]
    } else {
        &[DateOrder::MonthDayYear, DateOrder::DayMonthYear]
    }
}

/// Resolve a year-last date by walking [`date_attempts`] in order.
pub fn resolve_day_month(
    first: u32,
    second: u32,
    year: i32,
) -> Result<(NaiveDate, DateOrder), TemporalError> {
    date_attempts(first)
        .iter()
        .find_map(|order| {
            order
                .build(first, second, year)
                .map(|date| (date, *order))
        })
        .ok_or(TemporalError::NoDayMonthOrder {
            first,
            second,
            year,
        })
}

/// Classify a value without converting it.
pub fn classify_temporal(value: &CellValue, options: &TemporalOptions) -> TemporalKind {
    match value {
        CellValue::Number(serial) if options.serial_dates && is_date_serial(*serial) => {
            TemporalKind::DateTime
        }
        CellValue::DateTime(_) => TemporalKind::DateTime,
        CellValue::Text(text) => match_text(text.trim())
            .map(|parsed| parsed.kind())
            .unwrap_or_default(),
        _ => TemporalKind::None,
    }
}

/// Convert a value to its canonical temporal text, if it is temporal.
pub fn convert_temporal(value: &CellValue, options: &TemporalOptions) -> TemporalOutcome {
    match value {
        CellValue::Number(serial) if options.serial_dates && is_date_serial(*serial) => {
            match serial_to_moment(*serial) {
                Ok(moment) => TemporalOutcome::Converted {
                    kind: TemporalKind::DateTime,
                    text: render_moment(moment, false),
                },
                Err(error) => TemporalOutcome::Failed(error),
            }
        }
        CellValue::DateTime(moment) => TemporalOutcome::Converted {
            kind: TemporalKind::DateTime,
            text: render_moment(*moment, false),
        },
        CellValue::Text(text) => convert_text(text),
        _ => TemporalOutcome::Unchanged,
    }
}

fn is_date_serial(value: f64) -> bool {
    value > SERIAL_MIN && value < SERIAL_MAX
}

fn serial_to_moment(serial: f64) -> Result<NaiveDateTime, TemporalError> {
    let out_of_range = || TemporalError::SerialOutOfRange { serial };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(out_of_range)?;
    let mut days = serial.trunc() as i64;
    let mut seconds = (serial.fract() * SECONDS_PER_DAY as f64).round() as i64;
    if seconds >= SECONDS_PER_DAY {
        days += 1;
        seconds -= SECONDS_PER_DAY;
    }
    let date = epoch
        .checked_add_signed(Duration::days(days))
        .ok_or_else(out_of_range)?;
    let time = u32::try_from(seconds)
        .ok()
        .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0))
        .ok_or_else(out_of_range)?;
    Ok(date.and_time(time))
}

/// Date-only output when the moment carries no explicit time and sits at
/// midnight, full date-time otherwise.
fn render_moment(moment: NaiveDateTime, explicit_time: bool) -> String {
    if !explicit_time && moment.time() == NaiveTime::MIN {
        moment.format("%Y-%m-%d").to_string()
    } else {
        moment.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockTime {
    hour: u32,
    minute: u32,
    second: u32,
}

impl ClockTime {
    fn from_captures(caps: &Captures<'_>, first: usize) -> Option<Self> {
        Some(Self {
            hour: capture_number(caps, first)?,
            minute: capture_number(caps, first + 1)?,
            second: match caps.get(first + 2) {
                Some(_) => capture_number(caps, first + 2)?,
                None => 0,
            },
        })
    }

    fn to_time(self) -> Result<NaiveTime, TemporalError> {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second).ok_or(
            TemporalError::InvalidTime {
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            },
        )
    }

    /// Zero-padded rendering without range checks (`25:61` stays `25:61:00`).
    fn render(self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// A text value that matched one of the temporal shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextTemporal {
    NamedMonth {
        day: u32,
        month: u32,
        year: i32,
        time: Option<ClockTime>,
    },
    TimeOnly(ClockTime),
    Numeric {
        layout: DateLayout,
        parts: [u32; 3],
        time: Option<ClockTime>,
    },
}

impl TextTemporal {
    fn kind(&self) -> TemporalKind {
        match self {
            Self::NamedMonth { time, .. } | Self::Numeric { time, .. } => {
                if time.is_some() {
                    TemporalKind::DateTime
                } else {
                    TemporalKind::Date
                }
            }
            Self::TimeOnly(_) => TemporalKind::Time,
        }
    }

    fn render(&self) -> Result<String, TemporalError> {
        let (date, time) = match self {
            Self::TimeOnly(clock) => return Ok(clock.render()),
            Self::NamedMonth {
                day,
                month,
                year,
                time,
            } => (ymd(*year, *month, *day)?, time),
            Self::Numeric {
                layout: DateLayout::YearFirst,
                parts: [year, month, day],
                time,
            } => (ymd(*year as i32, *month, *day)?, time),
            Self::Numeric {
                layout: DateLayout::YearLast,
                parts: [first, second, year],
                time,
            } => (resolve_day_month(*first, *second, *year as i32)?.0, time),
        };
        match time {
            Some(clock) => Ok(render_moment(date.and_time(clock.to_time()?), true)),
            None => Ok(render_moment(date.and_time(NaiveTime::MIN), false)),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, TemporalError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(TemporalError::InvalidDate { year, month, day })
}

fn capture_number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn match_text(text: &str) -> Option<TextTemporal> {
    if let Some(caps) = NAMED_MONTH.captures(text)
        && let Some(month) = month_from_name(&caps[2])
    {
        let time = match caps.get(4) {
            Some(_) => Some(ClockTime::from_captures(&caps, 4)?),
            None => None,
        };
        return Some(TextTemporal::NamedMonth {
            day: capture_number(&caps, 1)?,
            month: month.number_from_month(),
            year: i32::try_from(capture_number(&caps, 3)?).ok()?,
            time,
        });
    }

    if let Some(caps) = TIME_ONLY.captures(text) {
        return ClockTime::from_captures(&caps, 1).map(TextTemporal::TimeOnly);
    }

    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.date_only.captures(text) {
            return numeric_match(&caps, pattern.layout, false);
        }
    }
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.with_time.captures(text) {
            return numeric_match(&caps, pattern.layout, true);
        }
    }
    None
}

fn numeric_match(caps: &Captures<'_>, layout: DateLayout, with_time: bool) -> Option<TextTemporal> {
    let parts = [
        capture_number(caps, 1)?,
        capture_number(caps, 2)?,
        capture_number(caps, 3)?,
    ];
    let time = if with_time {
        Some(ClockTime::from_captures(caps, 4)?)
    } else {
        None
    };
    Some(TextTemporal::Numeric {
        layout,
        parts,
        time,
    })
}

fn convert_text(text: &str) -> TemporalOutcome {
    let Some(parsed) = match_text(text.trim()) else {
        return TemporalOutcome::Unchanged;
    };
    match parsed.render() {
        Ok(rendered) => TemporalOutcome::Converted {
            kind: parsed.kind(),
            text: rendered,
        },
        Err(error) => TemporalOutcome::Failed(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_fraction_becomes_time_of_day() {
        let moment = serial_to_moment(45000.5).unwrap();
        assert_eq!(render_moment(moment, false), "2023-03-15 12:00:00");
    }

    #[test]
    fn serial_fraction_rounding_carries_into_next_day() {
        let moment = serial_to_moment(45000.999_999_9).unwrap();
        assert_eq!(render_moment(moment, false), "2023-03-16");
    }

    #[test]
    fn serial_bounds_are_exclusive() {
        assert!(!is_date_serial(1.0));
        assert!(is_date_serial(1.5));
        assert!(is_date_serial(2_958_465.0));
        assert!(!is_date_serial(2_958_466.0));
    }

    #[test]
    fn largest_serial_is_last_representable_day() {
        let moment = serial_to_moment(2_958_465.0).unwrap();
        assert_eq!(render_moment(moment, false), "9999-12-31");
    }

    #[test]
    fn explicit_time_is_kept_at_midnight() {
        let moment = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(render_moment(moment, true), "2024-01-05 00:00:00");
        assert_eq!(render_moment(moment, false), "2024-01-05");
    }

    #[test]
    fn named_month_requires_known_month() {
        assert!(match_text("01 Foo 2025").is_none());
        assert!(matches!(
            match_text("01 Agu 2025"),
            Some(TextTemporal::NamedMonth { month: 8, .. })
        ));
    }

    #[test]
    fn mixed_separators_do_not_match() {
        assert!(match_text("2024-01/05").is_none());
        assert!(match_text("05/01-2024").is_none());
    }
}
