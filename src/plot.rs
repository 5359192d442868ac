use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gnuplot::{AlignType, AutoOption, AxesCommon, Coordinate, Figure, LegendOption, PlotOption};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::series::Series;

/// Headroom above the tallest point so the upper-left legend stays clear.
pub const Y_HEADROOM: f64 = 1.4;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    /// Output file stem; the plotter appends its own extension.
    pub output_name: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Chart named after the result file it was reduced from.
    pub fn for_result_file(result_file: &Path, x_label: &str, y_label: &str, title: String) -> Self {
        let output_name = result_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| result_file.display().to_string());
        Self {
            x_label: x_label.to_owned(),
            y_label: y_label.to_owned(),
            title,
            output_name,
            series: Vec::new(),
        }
    }

    pub fn y_range(&self) -> (f64, f64) {
        let max = self
            .series
            .iter()
            .filter_map(Series::max_y)
            .fold(0.0, f64::max);
        (0.0, Y_HEADROOM * max)
    }
}

pub trait Plotter {
    /// Render `chart` into `plot_dir`, returning the written path.
    fn render(&mut self, chart: &ChartSpec, plot_dir: &Path) -> Result<PathBuf>;
}

impl<P: Plotter + ?Sized> Plotter for Box<P> {
    fn render(&mut self, chart: &ChartSpec, plot_dir: &Path) -> Result<PathBuf> {
        (**self).render(chart, plot_dir)
    }
}

/// PNG output through gnuplot.
pub struct GnuplotPlotter {
    pub width: u32,
    pub height: u32,
}

impl Default for GnuplotPlotter {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Plotter for GnuplotPlotter {
    fn render(&mut self, chart: &ChartSpec, plot_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(plot_dir)?;
        let path = plot_dir.join(format!("{}.png", chart.output_name));
        let (y_min, y_max) = chart.y_range();

        let mut fg = Figure::new();
        fg.set_title(&chart.title);
        {
            let axes = fg.axes2d();
            axes.set_x_label(&chart.x_label, &[])
                .set_y_label(&chart.y_label, &[])
                .set_y_range(AutoOption::Fix(y_min), AutoOption::Fix(y_max))
                .set_legend(
                    Coordinate::Graph(0.0),
                    Coordinate::Graph(1.0),
                    &[LegendOption::Placement(AlignType::AlignLeft, AlignType::AlignTop)],
                    &[],
                );
            for s in &chart.series {
                axes.lines(
                    s.xs.iter().map(|&x| x as f64),
                    s.ys.iter().cloned(),
                    &[PlotOption::Caption(s.label.as_str())],
                );
            }
        }
        fg.save_to_png(&path, self.width, self.height)
            .map_err(|e| Error::Plot(e.to_string()))?;
        info!("wrote chart {}", path.display());
        Ok(path)
    }
}

/// Writes the chart data as pretty JSON (`<name>.json`) instead of an image.
#[derive(Default)]
pub struct ChartDataPlotter;

#[derive(Serialize)]
struct ChartData<'a> {
    #[serde(flatten)]
    chart: &'a ChartSpec,
    y_range: (f64, f64),
}

impl Plotter for ChartDataPlotter {
    fn render(&mut self, chart: &ChartSpec, plot_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(plot_dir)?;
        let path = plot_dir.join(format!("{}.json", chart.output_name));
        let mut out = BufWriter::new(File::create(&path)?);
        let data = ChartData {
            chart,
            y_range: chart.y_range(),
        };
        serde_json::to_writer_pretty(&mut out, &data)?;
        writeln!(out)?;
        out.flush()?;
        info!("wrote chart data {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> ChartSpec {
        let mut chart = ChartSpec::for_result_file(
            Path::new("tmp/file_sync_rand_1000_0.01_1.res"),
            "x",
            "y",
            "t".to_owned(),
        );
        chart.series.push(Series::from_points("a", vec![(1, 10.0), (2, 40.0)]));
        chart.series.push(Series::from_points("b", vec![(1, 20.0), (2, 5.0)]));
        chart
    }

    #[test]
    fn output_name_drops_directory() {
        assert_eq!(chart().output_name, "file_sync_rand_1000_0.01_1.res");
    }

    #[test]
    fn y_range_has_headroom_over_all_series() {
        let (lo, hi) = chart().y_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 56.0).abs() < 1e-9);
    }

    #[test]
    fn chart_data_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = ChartDataPlotter.render(&chart(), dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            "file_sync_rand_1000_0.01_1.res.json"
        );
        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["title"], "t");
        assert_eq!(value["series"][1]["label"], "b");
        assert!((value["y_range"][1].as_f64().unwrap() - 56.0).abs() < 1e-9);
    }
}
