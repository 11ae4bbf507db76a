use thiserror::Error;

/// Errors surfaced by dataset construction, statistics and chart rendering.
///
/// All of them are synchronous and propagate straight to the caller; nothing
/// in this crate retries or recovers.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed dataset: missing columns, bad rows, duplicate dates.
    #[error("invalid input: {0}")]
    Input(String),

    /// The statistic is undefined for the dataset size.
    #[error("computation undefined: {0}")]
    Computation(&'static str),

    /// Unrecognized `plot_type` passed to `plot_combined_graph`.
    #[error("unrecognized plot type: {0:?} (expected candlestick, volume, both or all)")]
    InvalidOption(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure in the chart drawing backend.
    #[error("chart rendering failed: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, Error>;
