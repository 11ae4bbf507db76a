//! Descriptive statistics and chart rendering over daily OHLCV stock data.
//!
//! A [`StockMarketAnalysis`] is built once from a CSV file (or an already
//! loaded series) and then only queried: median high-low spread, sample
//! standard deviation of the open prices, and a handful of PNG chart
//! renderings (candlestick, candlestick vs volume, close-price evolution,
//! weekday volume distribution, combined figure).

pub mod analysis;
pub mod chart;
pub mod error;
pub mod loader;
pub mod model;
pub mod utils;

pub use analysis::StockMarketAnalysis;
pub use chart::PlotKind;
pub use error::{Error, Result};
pub use model::{DailyBar, DailySeries, Price};
pub use utils::format_y_labels;
