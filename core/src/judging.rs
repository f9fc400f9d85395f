pub mod compare;
pub mod runner;

pub use compare::*;
pub use runner::*;
