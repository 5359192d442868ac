//! Drives the measurement executables over a parameter sweep and collects
//! their stdout into one result file per run.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::Utc;

use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::sweep::{BlockRange, Increment, SweepSpec};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum ExperimentKind {
    #[display(fmt = "file_sync")]
    FileSync,
    #[display(fmt = "gossip")]
    Gossip,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum SubKind {
    #[display(fmt = "rand")]
    RandomError,
    #[display(fmt = "block")]
    BlockError,
    #[display(fmt = "actual")]
    TagDiff,
    #[display(fmt = "gossip")]
    Gossip,
}

/// `<kind>_<subkind>_<param>_<extra>_<timestamp>.res`
pub fn result_file_name(
    kind: ExperimentKind,
    subkind: SubKind,
    param: &str,
    extra: &str,
    timestamp: i64,
) -> String {
    format!("{}_{}_{}_{}_{}.res", kind, subkind, param, extra, timestamp)
}

pub struct ExperimentRunner {
    config: BenchConfig,
}

impl ExperimentRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Random-error model: each block flips with probability `error_prob`.
    pub fn generate_rand_data(
        &self,
        file_len: u64,
        range: BlockRange,
        error_prob: f64,
        num_trials: usize,
    ) -> Result<PathBuf> {
        let (path, out) = self.create_result_file(
            ExperimentKind::FileSync,
            SubKind::RandomError,
            &file_len.to_string(),
            &error_prob.to_string(),
        )?;
        let sweep = sweep(range, Increment::FILE_SYNC);
        for _ in 0..num_trials {
            for block_size in sweep.points() {
                let args = [
                    "--file-len".to_owned(),
                    file_len.to_string(),
                    "--error-prob".to_owned(),
                    error_prob.to_string(),
                    "--block-size".to_owned(),
                    block_size.to_string(),
                    "--rsync".to_owned(),
                    "true".to_owned(),
                ];
                run_into(&self.config.file_sync_bin, &args, &out)?;
            }
        }
        Ok(path)
    }

    /// Block-error model: `num_changes` whole blocks differ.
    pub fn generate_block_data(
        &self,
        file_len: u64,
        range: BlockRange,
        num_changes: u64,
        num_trials: usize,
    ) -> Result<PathBuf> {
        let (path, out) = self.create_result_file(
            ExperimentKind::FileSync,
            SubKind::BlockError,
            &file_len.to_string(),
            &num_changes.to_string(),
        )?;
        let sweep = sweep(range, Increment::FILE_SYNC);
        for _ in 0..num_trials {
            for block_size in sweep.points() {
                let args = [
                    "--file-len".to_owned(),
                    file_len.to_string(),
                    "--num-changes".to_owned(),
                    num_changes.to_string(),
                    "--block-size".to_owned(),
                    block_size.to_string(),
                    "--rsync".to_owned(),
                    "true".to_owned(),
                ];
                run_into(&self.config.file_sync_bin, &args, &out)?;
            }
        }
        Ok(path)
    }

    /// Syncs the snapshot of `project` at `tag2` against the one at `tag1`.
    /// The tag checkouts are re-prepared before every sync.
    pub fn generate_actual_data(
        &self,
        range: BlockRange,
        project: &str,
        tag1: &str,
        tag2: &str,
        num_trials: usize,
    ) -> Result<PathBuf> {
        let project = Path::new(project)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(project);
        let (path, out) = self.create_result_file(
            ExperimentKind::FileSync,
            SubKind::TagDiff,
            project,
            &format!("{}_{}", tag1, tag2),
        )?;
        let sweep = sweep(range, Increment::TAG_DIFF);
        for _ in 0..num_trials {
            for block_size in sweep.points() {
                self.prepare_tags(project, tag1, tag2)?;
                let args = [
                    "--f1".to_owned(),
                    format!("A/{}", project),
                    "--f2".to_owned(),
                    format!("B/{}", project),
                    "--block-size".to_owned(),
                    block_size.to_string(),
                    "--rsync".to_owned(),
                    "true".to_owned(),
                ];
                run_into(&self.config.file_sync_bin, &args, &out)?;
            }
        }
        Ok(path)
    }

    pub fn generate_gossip_data(&self, num_trials: usize) -> Result<PathBuf> {
        let (path, out) =
            self.create_result_file(ExperimentKind::Gossip, SubKind::Gossip, "", "")?;
        for _ in 0..num_trials {
            run_into(&self.config.gossip_bin, &[], &out)?;
        }
        Ok(path)
    }

    fn create_result_file(
        &self,
        kind: ExperimentKind,
        subkind: SubKind,
        param: &str,
        extra: &str,
    ) -> Result<(PathBuf, File)> {
        fs::create_dir_all(&self.config.temp_dir)?;
        let name = result_file_name(kind, subkind, param, extra, Utc::now().timestamp());
        let path = self.config.temp_dir.join(name);
        let file = File::create(&path)?;
        info!("writing {} {} results to {}", kind, subkind, path.display());
        Ok((path, file))
    }

    fn prepare_tags(&self, project: &str, tag1: &str, tag2: &str) -> Result<()> {
        let script = &self.config.tag_prepare_script;
        let output = Command::new(script)
            .args(&[project, tag1, tag2])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: script.display().to_string(),
                source,
            })?;
        debug!("{}: {}", script.display(), String::from_utf8_lossy(&output.stdout).trim());
        if !output.status.success() {
            warn!("{} exited with {}", script.display(), output.status);
        }
        Ok(())
    }
}

fn sweep(range: BlockRange, increment: Increment) -> SweepSpec {
    let spec = SweepSpec::new(range, increment);
    info!(
        "block sizes {}..{} by {} (step {})",
        spec.start, spec.end, increment, spec.increment
    );
    spec
}

/// Run `program` to completion with stdout appended to `out`. A non-zero exit
/// is logged and otherwise ignored.
fn run_into(program: &Path, args: &[String], out: &File) -> Result<()> {
    debug!("running {} {}", program.display(), args.join(" "));
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out.try_clone()?))
        .status()
        .map_err(|source| Error::Spawn {
            program: program.display().to_string(),
            source,
        })?;
    if !status.success() {
        warn!("{} {} exited with {}", program.display(), args.join(" "), status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(
            result_file_name(
                ExperimentKind::FileSync,
                SubKind::RandomError,
                "1000000",
                "0.001",
                1400000000
            ),
            "file_sync_rand_1000000_0.001_1400000000.res"
        );
        assert_eq!(
            result_file_name(ExperimentKind::Gossip, SubKind::Gossip, "", "", 7),
            "gossip_gossip___7.res"
        );
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ExperimentRunner::new(BenchConfig {
            gossip_bin: dir.path().join("no-such-binary"),
            temp_dir: dir.path().join("tmp"),
            ..BenchConfig::default()
        });
        match runner.generate_gossip_data(1) {
            Err(Error::Spawn { program, .. }) => assert!(program.ends_with("no-such-binary")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
