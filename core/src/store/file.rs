use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::config::{Config, RepoConfig};
use crate::error::{JudgeError, Result};
use crate::model::{NewSubmission, Problem, ProblemId, Submission, TestCase};

use super::{ProblemStore, SubmissionStore};

/// On-disk shape of one `problems/*.toml` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProblemFile {
    pub id: ProblemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub testcase: Vec<TestCase>,
}

impl ProblemFile {
    pub fn from_toml(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// File-backed judge repository: `problems/*.toml` for problem data and
/// an append-only JSONL submission history.
///
/// Problem files are re-read on every call rather than held open, so an
/// admin can add problems or append test cases between judge calls. The
/// submission file is written one whole line at a time under a lock,
/// which is the transactional boundary: a reader sees either the full
/// record or nothing.
#[derive(Debug)]
pub struct FileStore {
    problem_dir: PathBuf,
    submission_file: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub const EXAMPLE_PROBLEM_FILENAME: &str = "problem-example.toml";

    pub fn open(root_dir: impl AsRef<Path>, cfg: &RepoConfig) -> Self {
        let root_dir = root_dir.as_ref();
        Self {
            problem_dir: root_dir.join(&cfg.problem_dir),
            submission_file: root_dir.join(&cfg.submission_file),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a fresh judge repository: example config plus one example
    /// problem the admin can copy from.
    pub fn init(dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fsutil::write_with_mkdir(dir.join(Config::FILENAME), Config::example_toml())
            .map_err(storage_err)?;
        let cfg = Config::default();
        fsutil::write_with_mkdir(
            dir.join(&cfg.repository.problem_dir).join("1.toml"),
            crate::config::example_problem_toml(),
        )
        .map_err(storage_err)?;
        Ok(())
    }

    fn load_problems(&self) -> Result<BTreeMap<ProblemId, ProblemFile>> {
        let mut problems = BTreeMap::new();
        for entry in fsutil::read_dir(&self.problem_dir)
            .map_err(storage_err)?
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "toml") {
                continue;
            }
            let pf: ProblemFile = fsutil::read_toml_with_deserialize(&path).map_err(storage_err)?;
            problems.insert(pf.id, pf);
        }
        Ok(problems)
    }

    fn load_problem(&self, id: ProblemId) -> Result<Option<ProblemFile>> {
        Ok(self.load_problems()?.remove(&id))
    }

    /// All problems in ascending id order.
    pub fn problems(&self) -> Result<Vec<Problem>> {
        Ok(self
            .load_problems()?
            .into_values()
            .map(|pf| Problem {
                id: pf.id,
                title: pf.title,
                description: pf.description,
            })
            .collect())
    }

    /// Full submission history in insertion order.
    pub fn submissions(&self) -> Result<Vec<Submission>> {
        if !self.submission_file.is_file() {
            return Ok(Vec::new());
        }
        let lines = fsutil::read_lines(&self.submission_file).map_err(storage_err)?;
        lines
            .iter()
            .map(|line| serde_json::from_str(line).map_err(|e| storage_err(anyhow::Error::new(e))))
            .collect()
    }
}

fn storage_err(e: impl Into<anyhow::Error>) -> JudgeError {
    JudgeError::Storage(e.into())
}

#[async_trait]
impl ProblemStore for FileStore {
    async fn get_problem(&self, id: ProblemId) -> Result<Option<Problem>> {
        Ok(self.load_problem(id)?.map(|pf| Problem {
            id: pf.id,
            title: pf.title,
            description: pf.description,
        }))
    }

    async fn get_test_cases(
        &self,
        problem_id: ProblemId,
        include_hidden: bool,
    ) -> Result<Vec<TestCase>> {
        let Some(pf) = self.load_problem(problem_id)? else {
            return Err(JudgeError::ProblemNotFound(problem_id));
        };
        Ok(pf
            .testcase
            .into_iter()
            .filter(|t| include_hidden || !t.hidden)
            .collect())
    }

    async fn next_problem_id_after(&self, id: ProblemId) -> Result<Option<ProblemId>> {
        Ok(self
            .load_problems()?
            .range((Bound::Excluded(id), Bound::Unbounded))
            .next()
            .map(|(&id, _)| id))
    }
}

#[async_trait]
impl SubmissionStore for FileStore {
    async fn record_submission(&self, new: NewSubmission) -> Result<Submission> {
        let guard = match self.write_lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next_id = if self.submission_file.is_file() {
            fsutil::read_lines(&self.submission_file)
                .map_err(storage_err)?
                .len() as i64
                + 1
        } else {
            1
        };
        let submission = Submission {
            id: next_id,
            username: new.username,
            problem_id: new.problem_id,
            code: new.code,
            verdict: new.verdict,
            passed: new.passed,
            total: new.total,
            created_at: Utc::now(),
        };
        let line = serde_json::to_string(&submission)
            .map_err(|e| storage_err(anyhow::Error::new(e)))?;
        fsutil::append_line(&self.submission_file, &line).map_err(storage_err)?;
        drop(guard);
        Ok(submission)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Verdict;

    fn init_store(dir: &Path) -> FileStore {
        FileStore::init(dir).unwrap();
        let cfg = Config::from_toml_file(dir.join(Config::FILENAME)).unwrap();
        FileStore::open(dir, &cfg.repository)
    }

    #[tokio::test]
    async fn init_should_create_loadable_example_problem() {
        let dir = tempfile::tempdir().unwrap();
        let store = init_store(dir.path());

        let problem = store.get_problem(1).await.unwrap().unwrap();
        assert_eq!(problem.title, "A + B");

        let visible = store.get_test_cases(1, false).await.unwrap();
        let all = store.get_test_cases(1, true).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn unknown_problem_should_be_none_or_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = init_store(dir.path());

        assert!(store.get_problem(99).await.unwrap().is_none());
        assert!(matches!(
            store.get_test_cases(99, true).await.unwrap_err(),
            JudgeError::ProblemNotFound(99)
        ));
    }

    #[tokio::test]
    async fn next_problem_id_should_follow_file_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = init_store(dir.path());

        fsutil::write_with_mkdir(
            dir.path().join("problems/5.toml"),
            r#"
id = 5
title = "Echo"

[[testcase]]
input = "x\n"
output = "x"
"#,
        )
        .unwrap();

        assert_eq!(store.next_problem_id_after(0).await.unwrap(), Some(1));
        assert_eq!(store.next_problem_id_after(1).await.unwrap(), Some(5));
        assert_eq!(store.next_problem_id_after(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn submissions_should_round_trip_through_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let store = init_store(dir.path());

        let rec = store
            .record_submission(NewSubmission {
                username: "alice".into(),
                problem_id: 1,
                code: "print(5)".into(),
                verdict: Verdict::WrongAnswer,
                passed: 0,
                total: 2,
            })
            .await
            .unwrap();
        assert_eq!(rec.id, 1);

        let history = store.submissions().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].verdict, Verdict::WrongAnswer);
        assert_eq!(history[0].username, "alice");
    }
}
