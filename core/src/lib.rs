pub mod config;
pub mod error;
pub mod judge;
pub mod judging;
pub mod model;
pub mod sandbox;
pub mod store;

pub use crate::config::Config;
pub use crate::error::{JudgeError, Result};
pub use crate::judge::{Judge, JudgeOutcome};
pub use crate::model::{CaseOutcome, Problem, Submission, TestCase, Verdict};
pub use crate::sandbox::{ExecutionResult, Sandbox};
