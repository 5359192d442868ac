extern crate chrono;
extern crate csv;
extern crate flate2;
extern crate gnuplot;
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate log;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod parser;
pub mod plot;
pub mod record;
pub mod report;
pub mod runner;
pub mod series;
pub mod sweep;

pub use crate::config::BenchConfig;
pub use crate::error::{Error, Result};
pub use crate::record::Record;
