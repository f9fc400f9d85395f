use std::path::PathBuf;

use super::{build_judge, load_config, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub code_file: PathBuf,

    /// File fed to the program as standard input (empty when omitted).
    #[arg(short = 'i', long)]
    pub stdin_file: Option<PathBuf>,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    // Ad-hoc runs are allowed outside a judge repository.
    let cfg = load_config().unwrap_or_default();

    let code = fsutil::read_to_string(&args.code_file)?;
    let stdin = match &args.stdin_file {
        Some(path) => fsutil::read_to_string(path)?,
        None => String::new(),
    };

    let judge = build_judge(&cfg);
    let output = judge.run_adhoc(&code, &stdin).await?;
    print!("{}", output);
    Ok(())
}
