use serde::Serialize;

use crate::aggregate::{by_int, group_and_reduce, mean};
use crate::error::{Error, Result};
use crate::record::Record;
use crate::sweep::BlockRange;

pub const BLOCK_SIZE: &str = "block_size";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Metric {
    pub field: &'static str,
    pub caption: &'static str,
}

/// Bytes sent by each mechanism under comparison.
pub const TRANSFER_METRICS: [Metric; 3] = [
    Metric {
        field: "total_bytes_no_strata",
        caption: "IBLT (no strata)",
    },
    Metric {
        field: "total_bytes_with_strata",
        caption: "IBLT (with strata)",
    },
    Metric {
        field: "rsync_bytes",
        caption: "rsync",
    },
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub xs: Vec<i64>,
    pub ys: Vec<f64>,
}

impl Series {
    pub fn from_points(label: &str, points: Vec<(i64, f64)>) -> Self {
        let (xs, ys) = points.into_iter().unzip();
        Self {
            label: label.to_owned(),
            xs,
            ys,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.xs.iter().cloned().zip(self.ys.iter().cloned())
    }

    /// Lowest y, earliest point on ties.
    pub fn min_point(&self) -> Option<(i64, f64)> {
        self.points().fold(None, |best, p| match best {
            Some(b) if b.1 <= p.1 => Some(b),
            _ => Some(p),
        })
    }

    pub fn max_y(&self) -> Option<f64> {
        self.ys.iter().cloned().fold(None, |m, y| match m {
            Some(m) if m >= y => Some(m),
            _ => Some(y),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesSet {
    pub series: Vec<Series>,
    pub minima: Vec<(i64, f64)>,
}

impl SeriesSet {
    pub fn xs(&self) -> Vec<&[i64]> {
        self.series.iter().map(|s| s.xs.as_slice()).collect()
    }

    pub fn ys(&self) -> Vec<&[f64]> {
        self.series.iter().map(|s| s.ys.as_slice()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }
}

/// One block-size series per metric, averaged per block size and clipped to
/// `range`, together with each series' cheapest point.
pub fn build_series(records: &[Record], metrics: &[Metric], range: BlockRange) -> Result<SeriesSet> {
    let mut set = SeriesSet {
        series: Vec::with_capacity(metrics.len()),
        minima: Vec::with_capacity(metrics.len()),
    };
    for metric in metrics {
        let points: Vec<(i64, f64)> =
            group_and_reduce(records, by_int(BLOCK_SIZE), mean(metric.field))?
                .into_iter()
                .filter(|&(x, _)| range.contains(x))
                .collect();
        let series = Series::from_points(metric.caption, points);
        let min = series.min_point().ok_or_else(|| Error::NoDataInRange {
            field: metric.field.to_owned(),
            start: range.start,
            end: range.end,
        })?;
        set.series.push(series);
        set.minima.push(min);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: Metric = Metric {
        field: "cost",
        caption: "cost",
    };

    fn rec(block_size: i64, cost: i64) -> Record {
        Record::new().with(BLOCK_SIZE, block_size).with("cost", cost)
    }

    #[test]
    fn range_filter_and_minimum() {
        let records = vec![rec(10, 100), rec(20, 50), rec(30, 80)];
        let set = build_series(&records, &[COST], BlockRange::new(15, 30)).unwrap();
        assert_eq!(set.xs(), vec![&[20i64, 30][..]]);
        assert_eq!(set.ys(), vec![&[50.0, 80.0][..]]);
        assert_eq!(set.minima, vec![(20, 50.0)]);
        assert_eq!(set.labels(), vec!["cost"]);
    }

    #[test]
    fn minimum_tie_takes_first() {
        let records = vec![rec(30, 9), rec(20, 5), rec(10, 5)];
        let set = build_series(&records, &[COST], BlockRange::new(0, 100)).unwrap();
        assert_eq!(set.minima, vec![(10, 5.0)]);
    }

    #[test]
    fn repeated_trials_are_averaged() {
        let records = vec![rec(10, 100), rec(10, 300), rec(20, 50)];
        let set = build_series(&records, &[COST], BlockRange::new(10, 20)).unwrap();
        assert_eq!(set.ys(), vec![&[200.0, 50.0][..]]);
    }

    #[test]
    fn empty_range_is_an_error() {
        let records = vec![rec(10, 100), rec(20, 50)];
        let err = build_series(&records, &[COST], BlockRange::new(500, 600)).unwrap_err();
        match err {
            Error::NoDataInRange { field, start, end } => {
                assert_eq!((field.as_str(), start, end), ("cost", 500, 600));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn one_series_per_metric() {
        let records = vec![Record::new()
            .with(BLOCK_SIZE, 10)
            .with("total_bytes_no_strata", 1)
            .with("total_bytes_with_strata", 2)
            .with("rsync_bytes", 3)];
        let set = build_series(&records, &TRANSFER_METRICS, BlockRange::new(0, 10)).unwrap();
        assert_eq!(set.labels(), vec!["IBLT (no strata)", "IBLT (with strata)", "rsync"]);
        assert_eq!(set.minima, vec![(10, 1.0), (10, 2.0), (10, 3.0)]);
    }
}
