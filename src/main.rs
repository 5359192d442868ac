extern crate structopt;
extern crate sync_bench;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use sync_bench::plot::{ChartDataPlotter, GnuplotPlotter, Plotter};
use sync_bench::report::{gossip_failure_report, Reporter, TransferReport, DEFAULT_FAILURE_BUCKETS};
use sync_bench::runner::ExperimentRunner;
use sync_bench::sweep::BlockRange;
use sync_bench::BenchConfig;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sync-bench",
    about = "Generate file sync and gossip measurements and chart them"
)]
struct Opt {
    /// JSON file with executable paths and output directories
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(long, parse(from_os_str))]
    temp_dir: Option<PathBuf>,
    #[structopt(long, parse(from_os_str))]
    plot_dir: Option<PathBuf>,
    /// Write chart data as JSON instead of rendering PNGs
    #[structopt(long)]
    chart_data: bool,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
struct Sweep {
    #[structopt(long, default_value = "10")]
    block_start: i64,
    #[structopt(long, default_value = "100")]
    block_end: i64,
    #[structopt(long, default_value = "1")]
    trials: usize,
    /// Only report on an existing result file
    #[structopt(long, parse(from_os_str))]
    file: Option<PathBuf>,
}

impl Sweep {
    fn range(&self) -> BlockRange {
        BlockRange::new(self.block_start, self.block_end)
    }
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Random error model
    Rand {
        #[structopt(flatten)]
        sweep: Sweep,
        #[structopt(long, default_value = "1000000")]
        file_len: u64,
        #[structopt(long, default_value = "0.001")]
        error_prob: f64,
    },
    /// Block error model
    Block {
        #[structopt(flatten)]
        sweep: Sweep,
        #[structopt(long, default_value = "1000000")]
        file_len: u64,
        #[structopt(long, default_value = "5")]
        num_changes: u64,
    },
    /// Two tags of a real repository
    Actual {
        #[structopt(flatten)]
        sweep: Sweep,
        #[structopt(long, default_value = "emacs")]
        project: String,
        #[structopt(long, default_value = "emacs-24.1")]
        tag1: String,
        #[structopt(long, default_value = "emacs-23.1")]
        tag2: String,
    },
    /// Multi-party gossip rounds to completion
    Gossip {
        #[structopt(long, default_value = "1")]
        trials: usize,
        #[structopt(long, parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Failed-node histograms of a gossip result file
    GossipFailures {
        #[structopt(long, parse(from_os_str))]
        file: PathBuf,
        #[structopt(long)]
        prime: i64,
        #[structopt(long, use_delimiter = true)]
        buckets: Vec<i64>,
    },
}

fn print_summary(report: &TransferReport) -> Result<()> {
    println!("{}", report.summary.line()?);
    Ok(())
}

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;
    let opt = Opt::from_args();

    let mut config = match &opt.config {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(dir) = opt.temp_dir {
        config.temp_dir = dir;
    }
    if let Some(dir) = opt.plot_dir {
        config.plot_dir = dir;
    }

    let plotter: Box<dyn Plotter> = if opt.chart_data {
        Box::new(ChartDataPlotter)
    } else {
        Box::new(GnuplotPlotter::default())
    };
    let mut reporter = Reporter::new(plotter, config.plot_dir.clone());
    let runner = ExperimentRunner::new(config);

    match opt.cmd {
        Cmd::Rand {
            sweep,
            file_len,
            error_prob,
        } => {
            let file = match sweep.file.clone() {
                Some(file) => file,
                None => runner.generate_rand_data(file_len, sweep.range(), error_prob, sweep.trials)?,
            };
            let report = reporter
                .rand_report(&file, sweep.range())
                .with_context(|| format!("random error report for {}", file.display()))?;
            print_summary(&report)?;
        }
        Cmd::Block {
            sweep,
            file_len,
            num_changes,
        } => {
            let file = match sweep.file.clone() {
                Some(file) => file,
                None => runner.generate_block_data(file_len, sweep.range(), num_changes, sweep.trials)?,
            };
            let report = reporter
                .block_report(&file, sweep.range())
                .with_context(|| format!("block error report for {}", file.display()))?;
            print_summary(&report)?;
        }
        Cmd::Actual {
            sweep,
            project,
            tag1,
            tag2,
        } => {
            let file = match sweep.file.clone() {
                Some(file) => file,
                None => runner.generate_actual_data(sweep.range(), &project, &tag1, &tag2, sweep.trials)?,
            };
            let report = reporter
                .actual_report(&file, sweep.range())
                .with_context(|| format!("tag diff report for {}", file.display()))?;
            print_summary(&report)?;
        }
        Cmd::Gossip { trials, file } => {
            let file = match file {
                Some(file) => file,
                None => runner.generate_gossip_data(trials)?,
            };
            let report = reporter
                .gossip_rounds_report(&file)
                .with_context(|| format!("gossip rounds report for {}", file.display()))?;
            info!("gossip chart written to {}", report.chart.display());
        }
        Cmd::GossipFailures {
            file,
            prime,
            buckets,
        } => {
            let buckets = if buckets.is_empty() {
                DEFAULT_FAILURE_BUCKETS.to_vec()
            } else {
                buckets
            };
            gossip_failure_report(&file, prime, &buckets)
                .with_context(|| format!("gossip failure report for {}", file.display()))?;
        }
    }
    Ok(())
}
