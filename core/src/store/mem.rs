use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{JudgeError, Result};
use crate::model::{NewSubmission, Problem, ProblemId, Submission, TestCase};

use super::{ProblemStore, SubmissionStore};

#[derive(Debug, Default)]
struct Inner {
    problems: BTreeMap<ProblemId, Problem>,
    test_cases: BTreeMap<ProblemId, Vec<TestCase>>,
    submissions: Vec<Submission>,
}

/// In-memory store. One mutex is the transactional boundary: a
/// submission write is atomic relative to every concurrent read.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_problem(&self, problem: Problem, test_cases: Vec<TestCase>) {
        let mut inner = self.lock();
        inner.test_cases.insert(problem.id, test_cases);
        inner.problems.insert(problem.id, problem);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-update; nothing here leaves
        // the maps inconsistent across a panic point.
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ProblemStore for MemStore {
    async fn get_problem(&self, id: ProblemId) -> Result<Option<Problem>> {
        Ok(self.lock().problems.get(&id).cloned())
    }

    async fn get_test_cases(
        &self,
        problem_id: ProblemId,
        include_hidden: bool,
    ) -> Result<Vec<TestCase>> {
        let inner = self.lock();
        if !inner.problems.contains_key(&problem_id) {
            return Err(JudgeError::ProblemNotFound(problem_id));
        }
        let cases = inner.test_cases.get(&problem_id).cloned().unwrap_or_default();
        Ok(cases
            .into_iter()
            .filter(|t| include_hidden || !t.hidden)
            .collect())
    }

    async fn next_problem_id_after(&self, id: ProblemId) -> Result<Option<ProblemId>> {
        Ok(self
            .lock()
            .problems
            .range((Bound::Excluded(id), Bound::Unbounded))
            .next()
            .map(|(&id, _)| id))
    }
}

#[async_trait]
impl SubmissionStore for MemStore {
    async fn record_submission(&self, new: NewSubmission) -> Result<Submission> {
        let mut inner = self.lock();
        let submission = Submission {
            id: inner.submissions.len() as i64 + 1,
            username: new.username,
            problem_id: new.problem_id,
            code: new.code,
            verdict: new.verdict,
            passed: new.passed,
            total: new.total,
            created_at: Utc::now(),
        };
        inner.submissions.push(submission.clone());
        Ok(submission)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Verdict;

    fn problem(id: ProblemId) -> Problem {
        Problem {
            id,
            title: format!("Problem {}", id),
            description: String::new(),
        }
    }

    fn case(hidden: bool) -> TestCase {
        TestCase {
            input: "1\n".into(),
            expected_output: "1".into(),
            hidden,
        }
    }

    #[tokio::test]
    async fn get_test_cases_should_filter_hidden_but_keep_order() {
        let store = MemStore::new();
        store.add_problem(problem(1), vec![case(false), case(true), case(false)]);

        let visible = store.get_test_cases(1, false).await.unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|t| !t.hidden));

        let all = store.get_test_cases(1, true).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[1].hidden);
    }

    #[tokio::test]
    async fn get_test_cases_for_unknown_problem_should_fail() {
        let store = MemStore::new();
        let err = store.get_test_cases(7, true).await.unwrap_err();
        assert!(matches!(err, JudgeError::ProblemNotFound(7)));
    }

    #[tokio::test]
    async fn next_problem_id_should_be_strictly_greater() {
        let store = MemStore::new();
        for id in [3, 10, 25] {
            store.add_problem(problem(id), vec![]);
        }
        assert_eq!(store.next_problem_id_after(2).await.unwrap(), Some(3));
        assert_eq!(store.next_problem_id_after(3).await.unwrap(), Some(10));
        assert_eq!(store.next_problem_id_after(25).await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_submission_should_assign_increasing_ids() {
        let store = MemStore::new();
        let new = |user: &str| NewSubmission {
            username: user.into(),
            problem_id: 1,
            code: "print(1)".into(),
            verdict: Verdict::Accepted,
            passed: 1,
            total: 1,
        };
        let a = store.record_submission(new("alice")).await.unwrap();
        let b = store.record_submission(new("bob")).await.unwrap();
        assert!(a.id < b.id);
        assert_eq!(store.submissions().len(), 2);
    }
}
