//! Chart rendering for [`StockMarketAnalysis`] datasets.
//!
//! Every `plot_*` method writes a PNG figure and returns the path it wrote.
//! Days are laid out on an index x axis labelled with their dates, so the
//! same drawing routines compose into the multi-panel combined figure.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Datelike;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::analysis::StockMarketAnalysis;
use crate::error::{Error, Result};
use crate::utils::format_y_labels;

const COL_UP: RGBColor = RGBColor(0x4d, 0xaf, 0x4a);
const COL_DOWN: RGBColor = RGBColor(0xe4, 0x1a, 0x1c);
const COL_CLOSE: RGBColor = RGBColor(0x98, 0x4e, 0xa3);
const COL_RANGE: RGBColor = RGBColor(0xf7, 0x81, 0xbf);
const COL_VOLUME: RGBColor = RGBColor(0x37, 0x7e, 0xb8);

const CANDLE_WIDTH: u32 = 12;
const PANEL_SIZE: (u32, u32) = (1024, 600);

const WEEKDAY_LABELS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Chart selection for [`StockMarketAnalysis::plot_combined_graph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlotKind {
    /// Candlestick chart only.
    Candlestick,
    /// Weekday volume distribution only.
    Volume,
    /// Candlestick next to the candlestick-vs-volume composite.
    Both,
    /// All four charts in a 2x2 grid.
    All,
}

impl PlotKind {
    fn figure_size(self) -> (u32, u32) {
        match self {
            PlotKind::Candlestick | PlotKind::Volume => PANEL_SIZE,
            PlotKind::Both => (1600, 640),
            PlotKind::All => (1400, 1000),
        }
    }
}

impl FromStr for PlotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "candlestick" => Ok(PlotKind::Candlestick),
            "volume" => Ok(PlotKind::Volume),
            "both" => Ok(PlotKind::Both),
            "all" => Ok(PlotKind::All),
            other => Err(Error::InvalidOption(other.to_string())),
        }
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}

impl StockMarketAnalysis {
    /// Renders the dataset as a candlestick chart, green for up days and red
    /// for down days, with the wick spanning the day's low..high range.
    pub fn plot_candlestick_chart<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.render(path, PANEL_SIZE, |root| self.draw_candlestick(root))
    }

    /// Candlestick chart with per-day volume bars on a secondary right-hand
    /// y axis sharing the date axis.
    pub fn plot_candlestick_chart_vs_volume<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.render(path, PANEL_SIZE, |root| self.draw_candlestick_vs_volume(root))
    }

    /// Close-price line with the daily low..high range shaded around it.
    pub fn plot_close_price_evolution<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.render(path, PANEL_SIZE, |root| self.draw_close_price_evolution(root))
    }

    /// Total traded volume per weekday (Monday through Friday) as bars.
    pub fn plot_volume_distribution<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.render(path, PANEL_SIZE, |root| self.draw_volume_distribution(root))
    }

    /// Renders the chart selection named by `plot_type` into one figure
    /// titled with the analysis label. Recognized values are `candlestick`,
    /// `volume`, `both` and `all` (case-insensitive); anything else is
    /// [`Error::InvalidOption`].
    pub fn plot_combined_graph<P: AsRef<Path>>(&self, plot_type: &str, path: P) -> Result<PathBuf> {
        let kind: PlotKind = plot_type.parse()?;

        self.render(path, kind.figure_size(), |root| {
            let titled = root
                .titled(self.label(), ("sans-serif", 28))
                .map_err(chart_err)?;

            match kind {
                PlotKind::Candlestick => self.draw_candlestick(&titled),
                PlotKind::Volume => self.draw_volume_distribution(&titled),
                PlotKind::Both => {
                    let panes = titled.split_evenly((1, 2));
                    self.draw_candlestick(&panes[0])?;
                    self.draw_candlestick_vs_volume(&panes[1])
                }
                PlotKind::All => {
                    let panes = titled.split_evenly((2, 2));
                    self.draw_candlestick(&panes[0])?;
                    self.draw_close_price_evolution(&panes[1])?;
                    self.draw_candlestick_vs_volume(&panes[2])?;
                    self.draw_volume_distribution(&panes[3])
                }
            }
        })
    }

    fn render<P, F>(&self, path: P, size: (u32, u32), draw: F) -> Result<PathBuf>
    where
        P: AsRef<Path>,
        F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> Result<()>,
    {
        let path = path.as_ref().to_path_buf();
        {
            let root = BitMapBackend::new(&path, size).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;
            draw(&root)?;
            root.present().map_err(chart_err)?;
        }

        debug!(path = %path.display(), "chart written");
        Ok(path)
    }

    fn draw_candlestick<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let mut chart = ChartBuilder::on(area)
            .caption("Candlestick Chart", ("sans-serif", 20))
            .margin(8)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(self.x_range(), self.price_range())
            .map_err(chart_err)?;

        let date_labels = |x: &f64| self.date_label(*x);
        chart
            .configure_mesh()
            .x_labels(self.len().min(8))
            .x_label_formatter(&date_labels)
            .y_label_formatter(&|y: &f64| format_y_labels(*y))
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(self.data().values().enumerate().map(|(ix, bar)| {
                CandleStick::new(
                    ix as f64,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    COL_UP.filled(),
                    COL_DOWN.filled(),
                    CANDLE_WIDTH,
                )
            }))
            .map_err(chart_err)?;

        Ok(())
    }

    fn draw_candlestick_vs_volume<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let max_volume = self
            .data()
            .values()
            .map(|bar| bar.volume as f64)
            .fold(0.0, f64::max)
            .max(1.0);

        let mut chart = ChartBuilder::on(area)
            .caption("Candlestick Chart vs Volume", ("sans-serif", 20))
            .margin(8)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .right_y_label_area_size(56)
            .build_cartesian_2d(self.x_range(), self.price_range())
            .map_err(chart_err)?
            .set_secondary_coord(self.x_range(), 0.0..max_volume * 1.1);

        let date_labels = |x: &f64| self.date_label(*x);
        chart
            .configure_mesh()
            .x_labels(self.len().min(8))
            .x_label_formatter(&date_labels)
            .y_label_formatter(&|y: &f64| format_y_labels(*y))
            .draw()
            .map_err(chart_err)?;

        chart
            .configure_secondary_axes()
            .y_label_formatter(&|y: &f64| format_y_labels(*y))
            .draw()
            .map_err(chart_err)?;

        // Volume first so the candles stay on top.
        chart
            .draw_secondary_series(self.data().values().enumerate().map(|(ix, bar)| {
                let color = if bar.is_up() { COL_UP } else { COL_DOWN };
                Rectangle::new(
                    [(ix as f64 - 0.2, 0.0), (ix as f64 + 0.2, bar.volume as f64)],
                    color.mix(0.3).filled(),
                )
            }))
            .map_err(chart_err)?;

        chart
            .draw_series(self.data().values().enumerate().map(|(ix, bar)| {
                CandleStick::new(
                    ix as f64,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    COL_UP.filled(),
                    COL_DOWN.filled(),
                    CANDLE_WIDTH,
                )
            }))
            .map_err(chart_err)?;

        Ok(())
    }

    fn draw_close_price_evolution<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let mut chart = ChartBuilder::on(area)
            .caption("Close Price Evolution", ("sans-serif", 20))
            .margin(8)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(self.x_range(), self.price_range())
            .map_err(chart_err)?;

        let date_labels = |x: &f64| self.date_label(*x);
        chart
            .configure_mesh()
            .x_labels(self.len().min(8))
            .x_label_formatter(&date_labels)
            .y_label_formatter(&|y: &f64| format_y_labels(*y))
            .draw()
            .map_err(chart_err)?;

        let highs: Vec<(f64, f64)> = self
            .data()
            .values()
            .enumerate()
            .map(|(ix, bar)| (ix as f64, bar.high))
            .collect();
        let lows: Vec<(f64, f64)> = self
            .data()
            .values()
            .enumerate()
            .map(|(ix, bar)| (ix as f64, bar.low))
            .collect();

        // Shaded band between the daily low and high.
        let band: Vec<(f64, f64)> = highs
            .iter()
            .copied()
            .chain(lows.iter().rev().copied())
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, COL_RANGE.mix(0.1))))
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(highs, COL_RANGE.stroke_width(1)))
            .map_err(chart_err)?
            .label("High")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], COL_RANGE));
        chart
            .draw_series(LineSeries::new(lows, COL_RANGE.stroke_width(1)))
            .map_err(chart_err)?
            .label("Low")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], COL_RANGE));

        let closes = self
            .data()
            .values()
            .enumerate()
            .map(|(ix, bar)| (ix as f64, bar.close));
        chart
            .draw_series(LineSeries::new(closes, COL_CLOSE.stroke_width(2)))
            .map_err(chart_err)?
            .label("Close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], COL_CLOSE.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        Ok(())
    }

    fn draw_volume_distribution<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let mut totals = [0.0f64; 5];
        for (date, bar) in self.data() {
            let ix = date.weekday().num_days_from_monday() as usize;
            // Weekend rows do not occur in exchange data, skip them if present.
            if ix < totals.len() {
                totals[ix] += bar.volume as f64;
            }
        }
        let max_total = totals.iter().copied().fold(0.0, f64::max).max(1.0);

        let mut chart = ChartBuilder::on(area)
            .caption("Volume Distribution per Weekday", ("sans-serif", 20))
            .margin(8)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5f64..4.5f64, 0.0..max_total * 1.1)
            .map_err(chart_err)?;

        let weekday_labels = |x: &f64| {
            let ix = x.round();
            if (0.0..5.0).contains(&ix) {
                WEEKDAY_LABELS[ix as usize].to_string()
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .x_labels(WEEKDAY_LABELS.len())
            .disable_x_mesh()
            .x_label_formatter(&weekday_labels)
            .y_label_formatter(&|y: &f64| format_y_labels(*y))
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(totals.iter().enumerate().map(|(ix, total)| {
                Rectangle::new(
                    [(ix as f64 - 0.3, 0.0), (ix as f64 + 0.3, *total)],
                    COL_VOLUME.mix(0.5).filled(),
                )
            }))
            .map_err(chart_err)?;

        Ok(())
    }

    /// Day-index x range with half a slot of padding on both sides.
    fn x_range(&self) -> Range<f64> {
        -0.5..self.len() as f64 - 0.5
    }

    fn price_range(&self) -> Range<f64> {
        let low = self
            .data()
            .values()
            .map(|bar| bar.low)
            .fold(f64::INFINITY, f64::min);
        let high = self
            .data()
            .values()
            .map(|bar| bar.high)
            .fold(f64::NEG_INFINITY, f64::max);

        // Keeps the range non-degenerate when every bar is flat.
        let pad = ((high - low) * 0.05).max(high * 1e-3);
        low - pad..high + pad
    }

    fn date_label(&self, x: f64) -> String {
        let ix = x.round();
        if ix < 0.0 || ix >= self.len() as f64 {
            return String::new();
        }
        self.data()
            .keys()
            .nth(ix as usize)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_week;

    fn week_analysis() -> StockMarketAnalysis {
        StockMarketAnalysis::new("WIG20 - August 2023", sample_week()).unwrap()
    }

    fn assert_png_written(path: &Path) {
        let meta = std::fs::metadata(path).expect("chart file exists");
        assert!(meta.len() > 0, "chart file is empty");
    }

    #[test]
    fn candlestick_chart_renders() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = week_analysis().plot_candlestick_chart(dir.path().join("candles.png"))?;
        assert_png_written(&out);
        Ok(())
    }

    #[test]
    fn candlestick_vs_volume_renders() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let out =
            week_analysis().plot_candlestick_chart_vs_volume(dir.path().join("volume.png"))?;
        assert_png_written(&out);
        Ok(())
    }

    #[test]
    fn close_price_evolution_renders() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = week_analysis().plot_close_price_evolution(dir.path().join("close.png"))?;
        assert_png_written(&out);
        Ok(())
    }

    #[test]
    fn volume_distribution_renders() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = week_analysis().plot_volume_distribution(dir.path().join("weekdays.png"))?;
        assert_png_written(&out);
        Ok(())
    }

    #[test]
    fn combined_graph_accepts_every_plot_kind() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let analysis = week_analysis();

        for kind in ["candlestick", "volume", "both", "all"] {
            let out = analysis.plot_combined_graph(kind, dir.path().join(format!("{kind}.png")))?;
            assert_png_written(&out);
        }
        Ok(())
    }

    #[test]
    fn combined_graph_rejects_unknown_plot_type() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let result = week_analysis().plot_combined_graph("invalid", dir.path().join("nope.png"));
        assert!(matches!(result, Err(Error::InvalidOption(_))));
        Ok(())
    }

    #[test]
    fn plot_kind_parsing_is_case_insensitive() {
        assert_eq!("Candlestick".parse::<PlotKind>().unwrap(), PlotKind::Candlestick);
        assert_eq!("BOTH".parse::<PlotKind>().unwrap(), PlotKind::Both);
        assert!(matches!(
            "close_price".parse::<PlotKind>(),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn single_day_dataset_still_renders() -> eyre::Result<()> {
        let mut data = sample_week();
        let last = *data.keys().last().unwrap();
        data.retain(|date, _| *date == last);

        let dir = tempfile::tempdir()?;
        let analysis = StockMarketAnalysis::new("one day", data)?;
        let out = analysis.plot_candlestick_chart(dir.path().join("single.png"))?;
        assert_png_written(&out);
        Ok(())
    }
}
