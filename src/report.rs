//! Per-experiment reports: parse a result file, reduce it to series, render a
//! chart and produce a one-line summary of the cheapest operating points.

use std::path::{Path, PathBuf};

use crate::aggregate::{by_int, concat_lists, group_and_reduce, percentile, Histogram};
use crate::error::{Error, Result};
use crate::parser::read_result_file;
use crate::plot::{ChartSpec, Plotter};
use crate::record::Record;
use crate::series::{build_series, Series, SeriesSet, TRANSFER_METRICS};
use crate::sweep::BlockRange;

const BLOCK_SIZE_LABEL: &str = "block size(bytes)";
const TRANSFER_LABEL: &str = "bytes transferred";
const ROUNDS_PERCENTILE: f64 = 99.9;
pub const DEFAULT_FAILURE_BUCKETS: [i64; 5] = [0, 1, 2, 3, 4];

/// Comma-separated summary of one report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub fields: Vec<String>,
}

impl Summary {
    fn push(&mut self, field: impl ToString) {
        self.fields.push(field.to_string());
    }

    pub fn line(&self) -> Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(vec![]);
        wtr.write_record(&self.fields)?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).trim_end().to_owned())
    }
}

#[derive(Clone, Debug)]
pub struct TransferReport {
    pub chart: PathBuf,
    pub series: SeriesSet,
    pub summary: Summary,
}

#[derive(Clone, Debug)]
pub struct GossipRoundsReport {
    pub chart: PathBuf,
    /// (distinct keys, rounds percentile)
    pub points: Vec<(i64, f64)>,
}

/// Project and tags encoded in a tag-diff result file name:
/// `..._<project>_<tag1>_<tag2>_<timestamp>.res`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagPair {
    pub project: String,
    pub tag1: String,
    pub tag2: String,
}

impl TagPair {
    pub fn from_result_file(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parts: Vec<&str> = name.split('_').collect();
        let n = parts.len();
        if n < 4 {
            return Err(Error::ResultFileName {
                path: path.to_owned(),
                expected: "<project>_<tag1>_<tag2>_<timestamp>.res",
            });
        }
        Ok(Self {
            project: parts[n - 4].to_owned(),
            tag1: parts[n - 3].to_owned(),
            tag2: parts[n - 2].to_owned(),
        })
    }
}

pub fn load_records(result_file: &Path) -> Result<Vec<Record>> {
    let parsed = read_result_file(result_file)?;
    if parsed.records.is_empty() {
        return Err(Error::InsufficientData(format!(
            "{} holds no complete records",
            result_file.display()
        )));
    }
    Ok(parsed.records)
}

pub struct Reporter<P> {
    plotter: P,
    plot_dir: PathBuf,
}

impl<P: Plotter> Reporter<P> {
    pub fn new(plotter: P, plot_dir: impl Into<PathBuf>) -> Self {
        Self {
            plotter,
            plot_dir: plot_dir.into(),
        }
    }

    pub fn rand_report(&mut self, result_file: &Path, range: BlockRange) -> Result<TransferReport> {
        let records = load_records(result_file)?;
        let first = &records[0];
        let error_prob = first.display("error_prob")?;
        let title = format!(
            "Random Error Model with p(err) = {}, File Length = {} bytes",
            error_prob,
            first.display("file_length")?
        );
        let (chart, series) = self.transfer_chart(result_file, &records, range, title)?;
        let summary = transfer_summary(error_prob, &series, first, range)?;
        Ok(TransferReport {
            chart,
            series,
            summary,
        })
    }

    pub fn block_report(&mut self, result_file: &Path, range: BlockRange) -> Result<TransferReport> {
        let records = load_records(result_file)?;
        let first = &records[0];
        let num_blocks = first.display("num_block_changes")?;
        let title = format!(
            "Block Error Model with {} blocks changed, File Length = {} bytes",
            num_blocks,
            first.display("file_length")?
        );
        let (chart, series) = self.transfer_chart(result_file, &records, range, title)?;
        let summary = transfer_summary(num_blocks, &series, first, range)?;
        Ok(TransferReport {
            chart,
            series,
            summary,
        })
    }

    pub fn actual_report(&mut self, result_file: &Path, range: BlockRange) -> Result<TransferReport> {
        let tags = TagPair::from_result_file(result_file)?;
        let records = load_records(result_file)?;
        let first = &records[0];
        let title = format!(
            "Transferring {} data from tag {} to tag {}",
            tags.project, tags.tag1, tags.tag2
        );
        let (chart, series) = self.transfer_chart(result_file, &records, range, title)?;
        let mut summary =
            transfer_summary(result_file.display().to_string(), &series, first, range)?;
        summary.push((first.f64("file2_size")? - first.f64("file1_size")?).abs());
        Ok(TransferReport {
            chart,
            series,
            summary,
        })
    }

    /// Rounds until every party holds a combination of all messages, as a
    /// high percentile per number of distinct keys.
    pub fn gossip_rounds_report(&mut self, result_file: &Path) -> Result<GossipRoundsReport> {
        let records = load_records(result_file)?;
        let points = group_and_reduce(
            &records,
            by_int("num_distinct_keys"),
            percentile("num_rounds", ROUNDS_PERCENTILE),
        )?;
        for (keys, rounds) in &points {
            info!("{} distinct keys: p{} rounds = {}", keys, ROUNDS_PERCENTILE, rounds);
        }

        let title = format!(
            "Number of rounds for all parties to receive a linear combination of all messages for p={}",
            records[0].display("prime")?
        );
        let mut spec = ChartSpec::for_result_file(
            result_file,
            "Number of parties",
            "Number of rounds to completion",
            title,
        );
        spec.series
            .push(Series::from_points("multi-party IBLT", points.clone()));
        let chart = self.plotter.render(&spec, &self.plot_dir)?;
        Ok(GossipRoundsReport { chart, points })
    }

    fn transfer_chart(
        &mut self,
        result_file: &Path,
        records: &[Record],
        range: BlockRange,
        title: String,
    ) -> Result<(PathBuf, SeriesSet)> {
        let set = build_series(records, &TRANSFER_METRICS, range)?;
        let mut spec = ChartSpec::for_result_file(result_file, BLOCK_SIZE_LABEL, TRANSFER_LABEL, title);
        spec.series = set.series.clone();
        let chart = self.plotter.render(&spec, &self.plot_dir)?;
        Ok((chart, set))
    }
}

/// Histogram of failed-node counts per number of distinct keys, restricted to
/// runs with the given prime modulus.
pub fn gossip_failure_report(
    result_file: &Path,
    prime: i64,
    boundaries: &[i64],
) -> Result<Vec<(i64, Histogram)>> {
    let mut keep = Vec::new();
    for r in load_records(result_file)? {
        if r.int("prime")? == prime {
            keep.push(r);
        }
    }
    if keep.is_empty() {
        return Err(Error::InsufficientData(format!(
            "no records with prime = {} in {}",
            prime,
            result_file.display()
        )));
    }

    let groups = group_and_reduce(&keep, by_int("num_distinct_keys"), concat_lists("nodes"))?;
    let histograms: Vec<(i64, Histogram)> = groups
        .into_iter()
        .map(|(keys, failed)| (keys, Histogram::from_values(&failed, boundaries)))
        .collect();
    for (keys, h) in &histograms {
        info!(
            "prime {} / {} distinct keys: failed nodes {:?} over buckets {:?}",
            prime,
            keys,
            h.counts,
            h.bucket_labels()
        );
    }
    Ok(histograms)
}

/// `<lead>, (min x, min y) per metric, compressed naive size, start, end`
fn transfer_summary(
    lead: String,
    series: &SeriesSet,
    first: &Record,
    range: BlockRange,
) -> Result<Summary> {
    let mut summary = Summary::default();
    summary.push(lead);
    for &(x, y) in &series.minima {
        summary.push(x);
        summary.push(y);
    }
    summary.push(first.display("file2_size_compressed")?);
    summary.push(range.start);
    summary.push(range.end);
    Ok(summary)
}
