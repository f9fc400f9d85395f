use std::path::PathBuf;

use anyhow::Context as _;
use colored::Colorize as _;
use sabaki_core::Verdict;

use super::{build_judge, load_config, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub code_file: PathBuf,

    #[arg(short = 'p', long)]
    pub problem: i64,

    #[arg(short = 'u', long)]
    pub username: String,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = load_config()?;
    let code = fsutil::read_to_string(&args.code_file)?;

    log::info!(
        "Submitting {} against problem {}",
        args.code_file.to_string_lossy(),
        args.problem
    );

    let judge = build_judge(&cfg);
    let outcome = judge
        .submit(&args.username, &code, args.problem)
        .await
        .with_context(|| format!("Failed to judge submission for problem {}", args.problem))?;

    let verdict_line = format!(
        "{} ({}/{} tests passed)",
        outcome.verdict, outcome.passed, outcome.total
    );
    match outcome.verdict {
        Verdict::Accepted => println!("{}", verdict_line.green()),
        Verdict::WrongAnswer => println!("{}", verdict_line.bright_red()),
    }
    println!("{}", outcome.summary_line());
    Ok(())
}
