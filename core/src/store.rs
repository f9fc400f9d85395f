pub mod file;
pub mod mem;

pub use file::FileStore;
pub use mem::MemStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewSubmission, Problem, ProblemId, Submission, TestCase};

/// Read interface over problems and their test cases. The engine never
/// mutates problems; test cases are append-only from its point of view.
#[async_trait]
pub trait ProblemStore: Send + Sync {
    async fn get_problem(&self, id: ProblemId) -> Result<Option<Problem>>;

    /// Test cases in stored order. `include_hidden = false` is the
    /// sample-check view.
    async fn get_test_cases(
        &self,
        problem_id: ProblemId,
        include_hidden: bool,
    ) -> Result<Vec<TestCase>>;

    /// Smallest problem id strictly greater than `id`, as a navigation
    /// hint for the caller. `None` when there is no further problem.
    async fn next_problem_id_after(&self, id: ProblemId) -> Result<Option<ProblemId>>;
}

/// Write interface for judge outcomes. One call per full-judge pass,
/// atomic relative to concurrent readers of submission history.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn record_submission(&self, new: NewSubmission) -> Result<Submission>;
}
