//! Date/time classification tags.

use std::fmt;

/// What kind of temporal value a cell denotes, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    /// Not recognized as a date or time.
    #[default]
    None,
    /// Calendar date without an explicit time of day.
    Date,
    /// Time of day only.
    Time,
    /// Calendar date with a time of day.
    DateTime,
}

impl TemporalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
        }
    }

    pub fn is_temporal(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
