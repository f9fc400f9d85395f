use std::path::PathBuf;

use anyhow::Context as _;

use super::{build_judge, load_config, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub code_file: PathBuf,

    #[arg(short = 'p', long)]
    pub problem: i64,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = load_config()?;
    let code = fsutil::read_to_string(&args.code_file)?;

    let judge = build_judge(&cfg);
    let report = judge
        .check_samples(&code, args.problem)
        .await
        .with_context(|| format!("Failed to check samples of problem {}", args.problem))?;

    if report.is_empty() {
        println!("Problem {} has no visible test cases.", args.problem);
    } else {
        print!("{}", report);
    }
    Ok(())
}
