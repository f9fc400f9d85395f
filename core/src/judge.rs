use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::{JudgeError, Result};
use crate::judging::CaseRunner;
use crate::model::{CaseOutcome, NewSubmission, ProblemId, Submission, Verdict};
use crate::sandbox::Sandbox;
use crate::store::{ProblemStore, SubmissionStore};

/// Result of a full-judge pass, shaped for the calling front-end.
/// `next_problem_id` is purely a navigation hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeOutcome {
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
    pub next_problem_id: Option<ProblemId>,
    pub submission: Submission,
}

impl JudgeOutcome {
    /// `verdict|passed|total|next_id` with a literal `None` sentinel,
    /// the line the calling front-end consumes.
    pub fn summary_line(&self) -> String {
        let next = match self.next_problem_id {
            Some(id) => id.to_string(),
            None => "None".to_owned(),
        };
        format!("{}|{}|{}|{}", self.verdict, self.passed, self.total, next)
    }
}

/// The judge orchestrator: ad-hoc run, sample check, full judge.
/// All three share one sandbox (and thus one concurrency bound).
#[derive(Debug)]
pub struct Judge<S> {
    sandbox: Sandbox,
    store: Arc<S>,
    run_time_limit: Duration,
    judge_time_limit: Duration,
}

impl<S> Judge<S>
where
    S: ProblemStore + SubmissionStore,
{
    pub const DEFAULT_RUN_TIME_LIMIT: Duration = Duration::from_secs(3);
    pub const DEFAULT_JUDGE_TIME_LIMIT: Duration = Duration::from_secs(5);

    pub fn new(sandbox: Sandbox, store: Arc<S>) -> Self {
        Self {
            sandbox,
            store,
            run_time_limit: Self::DEFAULT_RUN_TIME_LIMIT,
            judge_time_limit: Self::DEFAULT_JUDGE_TIME_LIMIT,
        }
    }

    pub fn from_config(cfg: &EngineConfig, store: Arc<S>) -> Self {
        Self::new(cfg.build_sandbox(), store)
            .run_time_limit(cfg.run_time_limit())
            .judge_time_limit(cfg.judge_time_limit())
    }

    pub fn run_time_limit(mut self, limit: Duration) -> Self {
        self.run_time_limit = limit;
        self
    }

    pub fn judge_time_limit(mut self, limit: Duration) -> Self {
        self.judge_time_limit = limit;
        self
    }

    /// Ad-hoc scratch execution: no problem, no grading. Returns stdout
    /// if any was produced, otherwise stderr (the front-end
    /// contract), or a fixed line on timeout since partial output is
    /// discarded by sandbox policy.
    pub async fn run_adhoc(&self, code: &str, stdin: &str) -> Result<String> {
        let res = self.sandbox.execute(code, stdin, self.run_time_limit).await?;
        if res.timed_out {
            return Ok(format!(
                "Time limit exceeded ({} ms)",
                self.run_time_limit.as_millis()
            ));
        }
        if res.stdout.is_empty() {
            Ok(res.stderr)
        } else {
            Ok(res.stdout)
        }
    }

    /// Sample check: visible cases only, human-readable report, nothing
    /// persisted.
    pub async fn check_samples(&self, code: &str, problem_id: ProblemId) -> Result<String> {
        self.ensure_problem_exists(problem_id).await?;
        let cases = self.store.get_test_cases(problem_id, false).await?;
        let outcomes = self.run_all(code, &cases).await?;
        Ok(render_report(&outcomes))
    }

    /// Full judge: every case, hidden included; persists a Submission;
    /// fails closed on a problem with zero test cases.
    pub async fn submit(
        &self,
        username: &str,
        code: &str,
        problem_id: ProblemId,
    ) -> Result<JudgeOutcome> {
        self.ensure_problem_exists(problem_id).await?;
        let cases = self.store.get_test_cases(problem_id, true).await?;
        if cases.is_empty() {
            return Err(JudgeError::NoTestCases(problem_id));
        }

        let outcomes = self.run_all(code, &cases).await?;
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let verdict = if passed == total {
            Verdict::Accepted
        } else {
            Verdict::WrongAnswer
        };

        let submission = self
            .store
            .record_submission(NewSubmission {
                username: username.to_owned(),
                problem_id,
                code: code.to_owned(),
                verdict,
                passed,
                total,
            })
            .await?;
        log::info!(
            "Judged submission #{} by '{}' on problem {}: {} ({}/{})",
            submission.id,
            username,
            problem_id,
            verdict,
            passed,
            total
        );

        let next_problem_id = self.store.next_problem_id_after(problem_id).await?;
        Ok(JudgeOutcome {
            verdict,
            passed,
            total,
            next_problem_id,
            submission,
        })
    }

    async fn run_all(
        &self,
        code: &str,
        cases: &[crate::model::TestCase],
    ) -> Result<Vec<CaseOutcome>> {
        CaseRunner::new(&self.sandbox, self.judge_time_limit)
            .run_cases(code, cases)
            .await
    }

    async fn ensure_problem_exists(&self, problem_id: ProblemId) -> Result<()> {
        match self.store.get_problem(problem_id).await? {
            Some(_) => Ok(()),
            None => Err(JudgeError::ProblemNotFound(problem_id)),
        }
    }
}

fn render_report(outcomes: &[CaseOutcome]) -> String {
    let mut report = String::new();
    for o in outcomes {
        if o.passed {
            let _ = writeln!(report, "Test Case {}: ✔ Passed", o.index);
        } else if o.timed_out {
            let _ = writeln!(report, "Test Case {}: ✖ Failed (Time limit exceeded)\n", o.index);
        } else {
            let _ = writeln!(
                report,
                "Test Case {}: ✖ Failed\nExpected: {}\nGot: {}\n",
                o.index,
                o.expected,
                o.actual.trim()
            );
        }
    }
    report
}
