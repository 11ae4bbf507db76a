use std::path::Path;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::loader;
use crate::model::{DailySeries, Price};

/// A labelled, immutable daily OHLCV dataset with read-only statistics and
/// chart rendering (see [`crate::chart`]).
pub struct StockMarketAnalysis {
    label: String,
    data: DailySeries,
}

impl StockMarketAnalysis {
    /// Wraps an already loaded series. Rejects an empty dataset and any bar
    /// violating the OHLC ordering invariants; bad rows are never patched up.
    pub fn new(label: impl Into<String>, data: DailySeries) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Input("dataset is empty".into()));
        }
        for (date, bar) in &data {
            if !bar.is_well_formed() {
                return Err(Error::Input(format!("malformed bar on {date}: {bar:?}")));
            }
        }

        Ok(Self {
            label: label.into(),
            data,
        })
    }

    /// Loads the dataset from a CSV file, see [`loader::load_ohlcv_csv`] for
    /// the accepted format.
    pub fn from_csv<P: AsRef<Path>>(label: impl Into<String>, path: P) -> Result<Self> {
        Self::new(label, loader::load_ohlcv_csv(path)?)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &DailySeries {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Median of the per-day spread (`high - low`). Even-sized datasets use
    /// the average of the two middle values; a single-day dataset returns
    /// that day's spread.
    pub fn calculate_median_spread(&self) -> Price {
        let spreads: Vec<Price> = self.data.values().map(|bar| bar.spread()).collect();
        median(&spreads)
    }

    /// Sample standard deviation (N−1 divisor) of the open prices. Undefined
    /// for a single-day dataset, which yields [`Error::Computation`] instead
    /// of a silent NaN.
    pub fn calculate_open_std(&self) -> Result<Price> {
        let n = self.data.len();
        if n < 2 {
            return Err(Error::Computation(
                "sample standard deviation needs at least two rows",
            ));
        }

        let mean = self.data.values().map(|bar| bar.open).sum::<Price>() / n as Price;
        let variance = self
            .data
            .values()
            .map(|bar| (bar.open - mean).powi(2))
            .sum::<Price>()
            / (n - 1) as Price;

        Ok(variance.sqrt())
    }
}

/// Standard midpoint median. `values` must be non-empty.
fn median(values: &[Price]) -> Price {
    let sorted: Vec<Price> = values.iter().copied().sorted_by(Price::total_cmp).collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
