//! Column schema validation.
//!
//! Resolves the header row of a price file into typed column positions
//! before any data row is parsed.

use std::collections::HashMap;

use csv::StringRecord;
use pricebook_core::{
    Error, ExtractionMode, Result, CLOSE_COLUMN, DATE_COLUMN, HIGH_COLUMN, LOW_COLUMN, OPEN_COLUMN,
};

/// Header name to column position, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Index a header row. When a name repeats, the first column wins.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            positions.entry(normalize_header_name(name)).or_insert(idx);
        }
        Self { positions }
    }

    /// Position of a column, matched case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&normalize_header_name(name)).copied()
    }

    /// Required columns of `mode` that are absent.
    pub fn missing(&self, mode: ExtractionMode) -> Vec<String> {
        mode.required_columns()
            .iter()
            .filter(|name| self.position(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }
}

/// Spreadsheet exports often carry a BOM on the first header.
fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

/// Validated column positions for one extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    CloseOnly {
        date: usize,
        close: usize,
    },
    FullOhlc {
        date: usize,
        open: usize,
        high: usize,
        low: usize,
        close: usize,
    },
}

/// Narrowest row the fixed vendor layout fits: timestamp, open, high, low, close.
const POSITIONAL_WIDTH: usize = 5;

impl Schema {
    /// Resolve the columns `mode` needs, or report every one that is missing.
    ///
    /// Without a `Date` header the first column holds the timestamp
    /// (`Local time`, `Gmt time`). Prices are then matched by name, or read
    /// from columns 1 to 4 as open, high, low and close when they are unnamed.
    pub fn resolve(headers: &StringRecord, mode: ExtractionMode, file: &str) -> Result<Self> {
        let index = HeaderIndex::from_headers(headers);
        let missing = index.missing(mode);
        if missing.is_empty() {
            return Self::named(&index, mode, None, file);
        }

        if index.position(DATE_COLUMN).is_none() {
            if missing.len() == 1 {
                return Self::named(&index, mode, Some(0), file);
            }
            if headers.len() >= POSITIONAL_WIDTH {
                return Ok(Self::positional(mode));
            }
        }

        Err(Error::MissingRequiredColumns {
            file: file.to_string(),
            missing,
        })
    }

    /// Fixed vendor layout: timestamp in column 0, then open, high, low, close.
    pub fn positional(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::CloseOnly => Schema::CloseOnly { date: 0, close: 4 },
            ExtractionMode::FullOhlc => Schema::FullOhlc {
                date: 0,
                open: 1,
                high: 2,
                low: 3,
                close: 4,
            },
        }
    }

    fn named(index: &HeaderIndex, mode: ExtractionMode, date: Option<usize>, file: &str) -> Result<Self> {
        let column = |name: &str| {
            index.position(name).ok_or_else(|| Error::MissingRequiredColumns {
                file: file.to_string(),
                missing: vec![name.to_string()],
            })
        };
        let date = match date {
            Some(date) => date,
            None => column(DATE_COLUMN)?,
        };

        Ok(match mode {
            ExtractionMode::CloseOnly => Schema::CloseOnly {
                date,
                close: column(CLOSE_COLUMN)?,
            },
            ExtractionMode::FullOhlc => Schema::FullOhlc {
                date,
                open: column(OPEN_COLUMN)?,
                high: column(HIGH_COLUMN)?,
                low: column(LOW_COLUMN)?,
                close: column(CLOSE_COLUMN)?,
            },
        })
    }

    pub fn mode(&self) -> ExtractionMode {
        match self {
            Schema::CloseOnly { .. } => ExtractionMode::CloseOnly,
            Schema::FullOhlc { .. } => ExtractionMode::FullOhlc,
        }
    }

    /// Position of the date column.
    pub fn date(&self) -> usize {
        match *self {
            Schema::CloseOnly { date, .. } | Schema::FullOhlc { date, .. } => date,
        }
    }

    /// Position of the close column.
    pub fn close(&self) -> usize {
        match *self {
            Schema::CloseOnly { close, .. } | Schema::FullOhlc { close, .. } => close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn test_resolve_close_only() {
        let schema = Schema::resolve(
            &headers(&["Date", "Open", "High", "Low", "Close", "Volume"]),
            ExtractionMode::CloseOnly,
            "AAPL.csv",
        )
        .unwrap();
        assert_eq!(schema, Schema::CloseOnly { date: 0, close: 4 });
    }

    #[test]
    fn test_resolve_full_ohlc_any_order() {
        let schema = Schema::resolve(
            &headers(&["Close", "Low", "Date", "High", "Open"]),
            ExtractionMode::FullOhlc,
            "X.csv",
        )
        .unwrap();
        assert_eq!(
            schema,
            Schema::FullOhlc { date: 2, open: 4, high: 3, low: 1, close: 0 }
        );
        assert_eq!(schema.mode(), ExtractionMode::FullOhlc);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let err = Schema::resolve(&headers(&["Date", "Open", "Close"]), ExtractionMode::FullOhlc, "X.csv")
            .unwrap_err();
        match err {
            Error::MissingRequiredColumns { file, missing } => {
                assert_eq!(file, "X.csv");
                assert_eq!(missing, vec!["High".to_string(), "Low".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_normalization() {
        let schema = Schema::resolve(
            &headers(&["\u{feff}date", " CLOSE "]),
            ExtractionMode::CloseOnly,
            "X.csv",
        )
        .unwrap();
        assert_eq!(schema.date(), 0);
        assert_eq!(schema.close(), 1);
    }

    #[test]
    fn test_timestamp_header_takes_first_column() {
        let schema = Schema::resolve(
            &headers(&["Local time", "Open", "High", "Low", "Close", "Volume"]),
            ExtractionMode::FullOhlc,
            "XAGUSD.csv",
        )
        .unwrap();
        assert_eq!(
            schema,
            Schema::FullOhlc { date: 0, open: 1, high: 2, low: 3, close: 4 }
        );

        let schema = Schema::resolve(&headers(&["Gmt time", "Close"]), ExtractionMode::CloseOnly, "X.csv").unwrap();
        assert_eq!(schema, Schema::CloseOnly { date: 0, close: 1 });
    }

    #[test]
    fn test_unnamed_prices_use_fixed_layout() {
        let schema = Schema::resolve(
            &headers(&["time", "o", "h", "l", "c", "v"]),
            ExtractionMode::FullOhlc,
            "X.csv",
        )
        .unwrap();
        assert_eq!(schema, Schema::positional(ExtractionMode::FullOhlc));

        let schema = Schema::resolve(&headers(&["time", "o", "h", "l", "c"]), ExtractionMode::CloseOnly, "X.csv").unwrap();
        assert_eq!(schema, Schema::CloseOnly { date: 0, close: 4 });
    }

    #[test]
    fn test_narrow_header_without_date_is_rejected() {
        let err = Schema::resolve(&headers(&["Open", "High"]), ExtractionMode::CloseOnly, "X.csv").unwrap_err();
        match err {
            Error::MissingRequiredColumns { missing, .. } => {
                assert_eq!(missing, vec!["Date".to_string(), "Close".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_header_first_wins() {
        let index = HeaderIndex::from_headers(&headers(&["Date", "Close", "Close"]));
        assert_eq!(index.position("Close"), Some(1));
    }
}
