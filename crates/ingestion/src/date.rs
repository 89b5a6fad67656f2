//! Date normalization.
//!
//! Reduces the date/time encodings found in vendor price files to a plain
//! calendar date. Candidate formats are tried in the configured order and the
//! first one that parses wins.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use pricebook_core::config::DateConfig;
use pricebook_core::{DateFormat, Error, NormalizedDate, Result, TimezonePolicy};

/// `05.05.2003 00:00:00.000 GMT+0900`
const GMT_OFFSET_MILLIS: &str = "%d.%m.%Y %H:%M:%S%.f GMT%z";
/// `05.05.2003 00:00:00 GMT+0900`
const GMT_OFFSET: &str = "%d.%m.%Y %H:%M:%S GMT%z";

const ISO_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const ISO_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const ISO_DATE: &str = "%Y-%m-%d";

/// Parses raw date fields into [`NormalizedDate`]s.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    formats: Vec<DateFormat>,
    positional_policy: TimezonePolicy,
    iso_policy: TimezonePolicy,
}

impl DateNormalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: &DateConfig) -> Self {
        Self {
            formats: config.formats.clone(),
            positional_policy: config.positional_policy,
            iso_policy: config.iso_policy,
        }
    }

    /// Candidate formats in the order they are tried.
    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    /// Normalize one raw field.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedDate> {
        self.normalize_detailed(raw).map(|(date, _)| date)
    }

    /// Normalize one raw field and report which format matched.
    pub fn normalize_detailed(&self, raw: &str) -> Result<(NormalizedDate, DateFormat)> {
        let value = clean(raw);
        if value.is_empty() {
            return Err(Error::date_parse(raw));
        }

        self.formats
            .iter()
            .find_map(|&format| self.parse_with(format, value).map(|date| (date, format)))
            .ok_or_else(|| Error::date_parse(raw))
    }

    /// Policy applied to offset-qualified values of `format`.
    pub fn policy_for(&self, format: DateFormat) -> TimezonePolicy {
        if format.is_positional() {
            self.positional_policy
        } else {
            self.iso_policy
        }
    }

    fn parse_with(&self, format: DateFormat, value: &str) -> Option<NormalizedDate> {
        let policy = self.policy_for(format);
        match format {
            DateFormat::GmtOffsetMillis if !has_fraction(value) => None,
            DateFormat::GmtOffsetMillis => DateTime::parse_from_str(value, GMT_OFFSET_MILLIS)
                .ok()
                .map(|dt| truncate(dt, policy)),
            DateFormat::GmtOffset => DateTime::parse_from_str(value, GMT_OFFSET)
                .ok()
                .map(|dt| truncate(dt, policy)),
            DateFormat::Iso => parse_iso(value, policy),
        }
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(&DateConfig::default())
    }
}

/// Strip whitespace and one layer of surrounding double quotes.
fn clean(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// chrono's `%.f` also accepts a missing fraction; the millisecond encoding requires one.
fn has_fraction(value: &str) -> bool {
    value
        .split_whitespace()
        .nth(1)
        .and_then(|time| time.rsplit(':').next())
        .is_some_and(|seconds| seconds.contains('.'))
}

fn truncate(dt: DateTime<FixedOffset>, policy: TimezonePolicy) -> NormalizedDate {
    match policy {
        TimezonePolicy::PreserveOffset => dt.date_naive().into(),
        TimezonePolicy::Utc => dt.with_timezone(&Utc).date_naive().into(),
    }
}

fn parse_iso(value: &str, policy: TimezonePolicy) -> Option<NormalizedDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(truncate(dt, policy));
    }
    for fmt in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(truncate(dt, policy));
        }
    }
    // No offset: the value is already a UTC wall-clock time.
    for fmt in ISO_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date().into());
        }
    }
    NaiveDate::parse_from_str(value, ISO_DATE).ok().map(Into::into)
}
