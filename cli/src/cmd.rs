pub mod check;
pub mod init;
pub mod problems;
pub mod run;
pub mod submit;

use std::path::Path;
use std::sync::Arc;

use sabaki_core::store::FileStore;
use sabaki_core::{Config, Judge};

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::Args),
    Problems(problems::Args),

    #[command(alias("r"))]
    Run(run::Args),

    #[command(alias("c"))]
    Check(check::Args),

    #[command(alias("s"))]
    Submit(submit::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Init(args) => init::exec(args, self),
            Problems(args) => problems::exec(args, self),
            Run(args) => run::exec(args, self).await,
            Check(args) => check::exec(args, self).await,
            Submit(args) => submit::exec(args, self).await,
        }
    }
}

pub(crate) fn load_config() -> anyhow::Result<Config> {
    Config::from_file_finding_in_ancestors(util::current_dir())
}

pub(crate) fn open_store(cfg: &Config) -> FileStore {
    let root = cfg
        .source_config_file
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));
    FileStore::open(root, &cfg.repository)
}

pub(crate) fn build_judge(cfg: &Config) -> Judge<FileStore> {
    Judge::from_config(&cfg.engine, Arc::new(open_store(cfg)))
}
