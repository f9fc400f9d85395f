use crate::model::ProblemId;

pub type Result<T> = std::result::Result<T, JudgeError>;

/// The only error type that crosses the engine boundary.
///
/// Everything a submitted program can do wrong (non-zero exit, timeout,
/// garbage output) is data on [`crate::sandbox::ExecutionResult`] or a
/// failed [`crate::model::CaseOutcome`], never an error. An error here
/// means the judge itself could not do its job.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("No such problem (id={0})")]
    ProblemNotFound(ProblemId),

    #[error("Problem {0} has no test cases; judging refused")]
    NoTestCases(ProblemId),

    #[error("Judging temporarily unavailable: failed to launch sandbox")]
    SandboxSpawn(#[source] std::io::Error),

    #[error("Judging temporarily unavailable: lost contact with sandboxed process")]
    SandboxIo(#[source] std::io::Error),

    #[error("Judging temporarily unavailable: storage failure")]
    Storage(#[source] anyhow::Error),
}

impl JudgeError {
    /// True for host-side failures (as opposed to a misconfigured or
    /// unknown problem). Callers use this to pick the generic
    /// "temporarily unavailable" message over a 404-style one.
    pub fn is_infrastructure(&self) -> bool {
        use JudgeError::*;
        matches!(self, SandboxSpawn(_) | SandboxIo(_) | Storage(_))
    }
}
