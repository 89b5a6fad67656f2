//! Fixed-format emitter.

use std::io::Write;

use pricebook_core::{FixedFormatRecord, OhlcSeries, Result};
use tracing::debug;

/// Default number of decimals for each price field.
pub const DEFAULT_PRECISION: usize = 6;

/// Counters for one emitted series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Lines written.
    pub rows_written: u64,
    /// Records rejected because a price was not finite.
    pub rows_skipped: u64,
}

/// Writes OHLC series as `YYYYMMDD Open High Low Close` lines.
#[derive(Debug, Clone, Copy)]
pub struct FixedFormatEmitter {
    precision: usize,
}

impl FixedFormatEmitter {
    /// Create an emitter printing `precision` decimals per price.
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Records of a series in date order.
    ///
    /// Series values are complete OHLC tuples, so every point yields a record.
    pub fn records<'a>(&self, series: &'a OhlcSeries) -> impl Iterator<Item = FixedFormatRecord> + 'a {
        series
            .iter()
            .map(|(&date, &ohlc)| FixedFormatRecord { date, ohlc })
    }

    /// Render one record as a line, without the trailing newline.
    pub fn format_record(&self, record: &FixedFormatRecord) -> String {
        let o = &record.ohlc;
        format!(
            "{} {:.p$} {:.p$} {:.p$} {:.p$}",
            record.date.compact(),
            o.open,
            o.high,
            o.low,
            o.close,
            p = self.precision,
        )
    }

    /// Write every valid record of `series`. No header, no index column.
    pub fn write<W: Write>(&self, series: &OhlcSeries, mut writer: W) -> Result<EmitStats> {
        let mut stats = EmitStats::default();

        for record in self.records(series) {
            // Extraction only yields finite prices; this guards hand-built series.
            if !record.ohlc.is_finite() {
                debug!("{}: skipping {} with non-finite prices", series.asset(), record.date);
                stats.rows_skipped += 1;
                continue;
            }
            writeln!(writer, "{}", self.format_record(&record))?;
            stats.rows_written += 1;
        }

        writer.flush()?;
        Ok(stats)
    }
}

impl Default for FixedFormatEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricebook_core::{NormalizedDate, Ohlc};

    fn date(y: i32, m: u32, d: u32) -> NormalizedDate {
        NormalizedDate::from_ymd(y, m, d).unwrap()
    }

    fn render(emitter: &FixedFormatEmitter, series: &OhlcSeries) -> (String, EmitStats) {
        let mut buf = Vec::new();
        let stats = emitter.write(series, &mut buf).unwrap();
        (String::from_utf8(buf).unwrap(), stats)
    }

    #[test]
    fn test_line_layout() {
        let series = OhlcSeries::from_points(
            "XAGUSD",
            vec![
                (date(2003, 5, 6), Ohlc::new(4.72, 4.8, 4.7, 4.79)),
                (date(2003, 5, 5), Ohlc::new(4.7, 4.75, 4.68, 4.725)),
            ],
        );
        let (text, stats) = render(&FixedFormatEmitter::default(), &series);

        assert_eq!(
            text,
            "20030505 4.700000 4.750000 4.680000 4.725000\n\
             20030506 4.720000 4.800000 4.700000 4.790000\n"
        );
        assert_eq!(stats.rows_written, 2);
    }

    #[test]
    fn test_custom_precision() {
        let series = OhlcSeries::from_points("X", vec![(date(2020, 1, 2), Ohlc::new(1.0, 2.5, 0.25, 1.126))]);
        let (text, _) = render(&FixedFormatEmitter::new(2), &series);
        assert_eq!(text, "20200102 1.00 2.50 0.25 1.13\n");
    }

    #[test]
    fn test_every_line_has_five_fields() {
        let series = OhlcSeries::from_points(
            "X",
            vec![
                (date(2020, 1, 2), Ohlc::new(1.0, 2.0, 0.5, 1.5)),
                (date(2020, 1, 3), Ohlc::new(f64::NAN, 2.0, 0.5, 1.5)),
                (date(2020, 1, 6), Ohlc::new(1.5, 2.0, 1.0, 1.75)),
            ],
        );
        let (text, stats) = render(&FixedFormatEmitter::default(), &series);

        assert_eq!(stats, EmitStats { rows_written: 2, rows_skipped: 1 });
        for line in text.lines() {
            assert_eq!(line.split_whitespace().count(), 5, "line: {line}");
        }
        assert!(!text.contains("20200103"));
    }

    #[test]
    fn test_date_round_trip() {
        let record = FixedFormatRecord {
            date: date(1999, 12, 31),
            ohlc: Ohlc::new(1.0, 1.0, 1.0, 1.0),
        };
        let line = FixedFormatEmitter::default().format_record(&record);
        let first = line.split(' ').next().unwrap();
        assert_eq!(first, "19991231");

        let close: f64 = line.split(' ').nth(4).unwrap().parse().unwrap();
        assert_relative_eq!(close, 1.0);
    }

    #[test]
    fn test_empty_series_writes_nothing() {
        let (text, stats) = render(&FixedFormatEmitter::default(), &OhlcSeries::new("X"));
        assert!(text.is_empty());
        assert_eq!(stats.rows_written, 0);
    }
}
