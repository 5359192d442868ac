use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Locations of the measurement executables and of the output directories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub file_sync_bin: PathBuf,
    pub gossip_bin: PathBuf,
    /// Checks out the two tags of a project into `A/<project>` and `B/<project>`.
    pub tag_prepare_script: PathBuf,
    pub temp_dir: PathBuf,
    pub plot_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            file_sync_bin: PathBuf::from("./bin/file_sync_testing"),
            gossip_bin: PathBuf::from("./network_testing"),
            tag_prepare_script: PathBuf::from("./generate_similar_tag.sh"),
            temp_dir: PathBuf::from("tmp/"),
            plot_dir: PathBuf::from("plot/"),
        }
    }
}

impl BenchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Ok(config)
    }
}
