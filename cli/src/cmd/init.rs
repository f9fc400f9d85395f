use std::path::PathBuf;

use colored::Colorize as _;
use sabaki_core::store::FileStore;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(default_value = "./")]
    dir: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    FileStore::init(&args.dir)?;
    println!(
        "{}",
        format!(
            "Successfully initialized judge repository. (path: {})",
            args.dir.to_string_lossy()
        )
        .green()
    );
    Ok(())
}
