use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::sandbox::Sandbox;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub engine: EngineConfig,
    pub repository: RepoConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    pub interpreter: PathBuf,
    pub run_time_limit_ms: u64,
    pub judge_time_limit_ms: u64,
    pub max_concurrent_sandboxes: usize,
    pub stdout_capture_max_bytes: usize,
    pub stderr_capture_max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoConfig {
    pub problem_dir: PathBuf,
    pub submission_file: PathBuf,
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

fn embedded_asset(filename: &str) -> String {
    let file = Asset::get(filename).unwrap_or_else(|| panic!("Missing embedded {}", filename));
    std::str::from_utf8(file.data.as_ref())
        .expect("Embedded asset is not UTF-8")
        .to_owned()
}

/// Example problem file written by `FileStore::init`.
pub fn example_problem_toml() -> String {
    embedded_asset(crate::store::FileStore::EXAMPLE_PROBLEM_FILENAME)
}

impl Config {
    pub const FILENAME: &str = "sabaki.toml";

    pub fn example_toml() -> String {
        embedded_asset(Self::FILENAME)
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let cur_dir = cur_dir.as_ref();
        cur_dir
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
            .with_context(|| {
                format!(
                    "Not in a sabaki-repository dir: Cannot find '{}'",
                    Self::FILENAME
                )
            })
    }

    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_filepath = Config::find_file_in_ancestors(cur_dir)?;
        Self::from_toml_file(config_filepath)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut cfg =
            Self::from_toml(&Self::example_toml()).expect("Embedded example config is invalid");
        cfg.source_config_file = None;
        cfg
    }
}

impl EngineConfig {
    pub fn run_time_limit(&self) -> Duration {
        Duration::from_millis(self.run_time_limit_ms)
    }

    pub fn judge_time_limit(&self) -> Duration {
        Duration::from_millis(self.judge_time_limit_ms)
    }

    pub fn build_sandbox(&self) -> Sandbox {
        Sandbox::new(self.max_concurrent_sandboxes)
            .interpreter(&self.interpreter)
            .stdout_capture_max_bytes(self.stdout_capture_max_bytes)
            .stderr_capture_max_bytes(self.stderr_capture_max_bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml();
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();

        let Config {
            source_config_file,
            engine,
            repository: repo,
        } = cfg;

        assert_eq!(source_config_file, None);
        assert_eq!(engine.interpreter, Path::new("python3"));
        assert_eq!(engine.run_time_limit(), Duration::from_secs(3));
        assert_eq!(engine.judge_time_limit(), Duration::from_secs(5));
        assert_eq!(engine.max_concurrent_sandboxes, 4);
        assert!(engine.stdout_capture_max_bytes > 0);
        assert!(engine.stderr_capture_max_bytes > 0);

        assert_eq!(repo.problem_dir, Path::new("problems"));
        assert_eq!(repo.submission_file, Path::new("submissions.jsonl"));
    }

    #[test]
    fn example_problem_toml_should_be_parsable() {
        let toml = example_problem_toml();
        let problem = dbg!(crate::store::file::ProblemFile::from_toml(&toml)).unwrap();
        assert!(!problem.testcase.is_empty());
        assert!(problem.testcase.iter().any(|t| t.hidden));
    }
}
