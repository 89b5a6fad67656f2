//! Core data types for the pricebook pipeline.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column holding the date/time field.
pub const DATE_COLUMN: &str = "Date";
/// Column holding the open price.
pub const OPEN_COLUMN: &str = "Open";
/// Column holding the high price.
pub const HIGH_COLUMN: &str = "High";
/// Column holding the low price.
pub const LOW_COLUMN: &str = "Low";
/// Column holding the close price.
pub const CLOSE_COLUMN: &str = "Close";

/// A calendar date with no time-of-day and no timezone.
///
/// This is the join key across assets. Two dates from files recorded in
/// different timezones compare by calendar day only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDate(NaiveDate);

impl NormalizedDate {
    /// Wrap a chrono date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year, month and day. Returns `None` for an invalid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying chrono date.
    #[inline]
    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Render as the 8-digit `YYYYMMDD` form used by the fixed format.
    pub fn compact(self) -> String {
        format!("{:04}{:02}{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl From<NaiveDate> for NormalizedDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A textual date/time encoding the normalizer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `05.05.2003 00:00:00.000 GMT+0900`
    GmtOffsetMillis,
    /// `05.05.2003 00:00:00 GMT+0900`
    GmtOffset,
    /// `2020-01-02`, `2020-01-02 00:00:00-05:00`, RFC 3339 and friends.
    Iso,
}

impl DateFormat {
    /// Whether this is one of the positional `DD.MM.YYYY ... GMT±HHMM` encodings.
    pub fn is_positional(self) -> bool {
        matches!(self, DateFormat::GmtOffsetMillis | DateFormat::GmtOffset)
    }
}

/// How an offset-qualified timestamp is reduced to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimezonePolicy {
    /// Keep the calendar date as written in the source offset.
    PreserveOffset,
    /// Shift to UTC, then truncate.
    Utc,
}

/// Which fields the extractor pulls out of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Date and close price only.
    CloseOnly,
    /// Date plus open, high, low and close.
    FullOhlc,
}

impl ExtractionMode {
    /// Columns that must be present for this mode.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            ExtractionMode::CloseOnly => &[DATE_COLUMN, CLOSE_COLUMN],
            ExtractionMode::FullOhlc => &[
                DATE_COLUMN,
                OPEN_COLUMN,
                HIGH_COLUMN,
                LOW_COLUMN,
                CLOSE_COLUMN,
            ],
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::CloseOnly => f.write_str("close-only"),
            ExtractionMode::FullOhlc => f.write_str("full-ohlc"),
        }
    }
}

/// Daily open/high/low/close prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open, high, low, close }
    }

    /// True when all four prices are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// One asset's date-indexed values.
///
/// Holds at most one value per date. Inserting a date that is already
/// present replaces the earlier value (last seen wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries<T> {
    asset: String,
    points: BTreeMap<NormalizedDate, T>,
}

/// Close-only series. A `None` close keeps its date in the outer join.
pub type CloseSeries = AssetSeries<Option<f64>>;

/// Full OHLC series.
pub type OhlcSeries = AssetSeries<Ohlc>;

impl<T> AssetSeries<T> {
    /// Create an empty series for an asset.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            points: BTreeMap::new(),
        }
    }

    /// Build a series from `(date, value)` pairs, later pairs overwriting earlier ones.
    pub fn from_points(asset: impl Into<String>, points: impl IntoIterator<Item = (NormalizedDate, T)>) -> Self {
        let mut series = Self::new(asset);
        for (date, value) in points {
            series.insert(date, value);
        }
        series
    }

    /// Asset identifier.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Insert a value, returning the one it replaced, if any.
    pub fn insert(&mut self, date: NormalizedDate, value: T) -> Option<T> {
        self.points.insert(date, value)
    }

    /// Value recorded for a date.
    pub fn get(&self, date: NormalizedDate) -> Option<&T> {
        self.points.get(&date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending date order.
    pub fn iter(&self) -> btree_map::Iter<'_, NormalizedDate, T> {
        self.points.iter()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NormalizedDate> + '_ {
        self.points.keys().copied()
    }

    pub fn first_date(&self) -> Option<NormalizedDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NormalizedDate> {
        self.points.keys().next_back().copied()
    }
}

impl<'a, T> IntoIterator for &'a AssetSeries<T> {
    type Item = (&'a NormalizedDate, &'a T);
    type IntoIter = btree_map::Iter<'a, NormalizedDate, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Date-aligned close prices for many assets.
///
/// Rows are sorted by date and cover the union of every contributing asset's
/// dates. Each row has exactly one cell per asset column, `None` where that
/// asset has no value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedTable {
    assets: Vec<String>,
    rows: BTreeMap<NormalizedDate, Vec<Option<f64>>>,
}

impl ConsolidatedTable {
    /// Create a table with the given asset columns and no rows.
    pub fn with_assets(assets: Vec<String>) -> Self {
        Self {
            assets,
            rows: BTreeMap::new(),
        }
    }

    /// Set one cell, creating the row (all nulls) if it does not exist yet.
    /// A `None` value still creates the row.
    ///
    /// Returns `false` if `column` is out of range.
    pub fn set(&mut self, date: NormalizedDate, column: usize, value: Option<f64>) -> bool {
        if column >= self.assets.len() {
            return false;
        }
        let width = self.assets.len();
        let row = self.rows.entry(date).or_insert_with(|| vec![None; width]);
        row[column] = value;
        true
    }

    /// Asset columns in insertion order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of date rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, asset columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.assets.len())
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NormalizedDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NormalizedDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NormalizedDate> {
        self.rows.keys().next_back().copied()
    }

    /// Cells of one row, in asset column order.
    pub fn row(&self, date: NormalizedDate) -> Option<&[Option<f64>]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> btree_map::Iter<'_, NormalizedDate, Vec<Option<f64>>> {
        self.rows.iter()
    }

    /// One cell. `None` both for a null cell and for an unknown date/asset.
    pub fn get(&self, date: NormalizedDate, asset: &str) -> Option<f64> {
        let column = self.assets.iter().position(|a| a == asset)?;
        self.rows.get(&date)?.get(column).copied().flatten()
    }
}

/// A fully populated row of the fixed-format output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedFormatRecord {
    pub date: NormalizedDate,
    pub ohlc: Ohlc,
}
