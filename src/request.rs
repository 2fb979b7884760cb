//! Construction of observation requests from calendar date bounds.
//!
//! A [`DateRange`] is parsed from `YYYY-MM-DD` strings and expanded into a
//! [`JobRequest`] whose window covers both boundary days entirely.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TideError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Start date used when the caller gives none.
pub const DEFAULT_START: &str = "2024-01-01";

/// Inclusive range of calendar days requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses both bounds, falling back to [`DEFAULT_START`] and `today`.
    ///
    /// An inverted range is accepted as-is; the remote service decides what
    /// to do with it.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, TideError> {
        let start = parse_date(start.unwrap_or(DEFAULT_START))?;
        let end = match end {
            Some(raw) => parse_date(raw)?,
            None => today,
        };
        Ok(Self { start, end })
    }

    pub fn start_label(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// Parses a strict, zero-padded `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TideError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| TideError::MalformedDate(raw.to_string()))?;
    // chrono also accepts unpadded fields such as 2024-1-5.
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(TideError::MalformedDate(raw.to_string()));
    }
    Ok(date)
}

/// File format requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
        }
    }
}

/// A fully expanded observation request for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub station: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub format: OutputFormat,
}

impl JobRequest {
    /// Expands `range` to `[start 00:00:00Z, end 23:59:59Z]`.
    pub fn new(station: u32, range: &DateRange) -> Self {
        let last_second = NaiveTime::MIN + TimeDelta::seconds(86_399);
        Self {
            station,
            start: range.start.and_time(NaiveTime::MIN).and_utc(),
            end: range.end.and_time(last_second).and_utc(),
            format: OutputFormat::Csv,
        }
    }
}
