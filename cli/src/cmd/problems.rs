use super::{load_config, open_store, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {}

pub fn exec(_args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = load_config()?;
    let store = open_store(&cfg);
    for problem in store.problems()? {
        println!("{}\t{}", problem.id, problem.title);
    }
    Ok(())
}
