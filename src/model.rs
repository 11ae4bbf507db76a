use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type Price = f64;

/// One trading day's OHLCV summary.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: usize,
}

/// Daily bars keyed by trading date. The `BTreeMap` keeps the series in
/// chronological order with unique dates.
pub type DailySeries = BTreeMap<NaiveDate, DailyBar>;

impl DailyBar {
    pub fn spread(&self) -> Price {
        self.high - self.low
    }

    /// Up day: close at or above open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Checks the OHLC ordering invariants. Prices must be finite and
    /// positive, `high >= low`, and both open and close must sit inside the
    /// low..high range.
    pub fn is_well_formed(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.open > 0.0
            && self.low > 0.0
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.open >= self.low
            && self.close >= self.low
    }
}
