//! Outer-join alignment of close-only series.
//!
//! The consolidated table covers the union of every input's dates. Columns
//! follow the order in which series were added; a cell is `None` when its
//! asset has no value on that date.

use std::collections::HashSet;

use pricebook_core::{CloseSeries, ConsolidatedTable, Error, Result};
use tracing::debug;

/// Collects fully materialized series and merges them into one table.
#[derive(Debug, Default)]
pub struct AlignmentEngine {
    series: Vec<CloseSeries>,
    seen: HashSet<String>,
}

impl AlignmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one series. Fails if its asset identifier was already added.
    pub fn add(&mut self, series: CloseSeries) -> Result<()> {
        if !self.seen.insert(series.asset().to_string()) {
            return Err(Error::duplicate_asset(series.asset()));
        }
        self.series.push(series);
        Ok(())
    }

    /// Whether a series with this asset identifier was already added.
    pub fn contains(&self, asset: &str) -> bool {
        self.seen.contains(asset)
    }

    /// Number of series added.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Merge everything added so far.
    ///
    /// Empty series get no column. Returns [`Error::NoValidSeries`] when
    /// nothing is left to merge.
    pub fn build(self) -> Result<ConsolidatedTable> {
        let series: Vec<CloseSeries> = self
            .series
            .into_iter()
            .filter(|s| {
                if s.is_empty() {
                    debug!("{}: no rows, leaving it out of the table", s.asset());
                }
                !s.is_empty()
            })
            .collect();

        if series.is_empty() {
            return Err(Error::NoValidSeries);
        }

        let assets = series.iter().map(|s| s.asset().to_string()).collect();
        let mut table = ConsolidatedTable::with_assets(assets);
        for (column, s) in series.iter().enumerate() {
            for (&date, &value) in s {
                table.set(date, column, value);
            }
        }

        debug!("aligned {} series into {} rows", table.assets().len(), table.len());
        Ok(table)
    }
}

/// Align a collection of series in one call.
pub fn align(series: impl IntoIterator<Item = CloseSeries>) -> Result<ConsolidatedTable> {
    let mut engine = AlignmentEngine::new();
    for s in series {
        engine.add(s)?;
    }
    engine.build()
}
