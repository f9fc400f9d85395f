use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProblemId = i64;
pub type SubmissionId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub description: String,
}

/// One test case of a problem.
/// Hidden cases are skipped by the sample check but judged on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(alias = "output")]
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Per-testcase judging fact. `index` is 1-based, matching report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub index: usize,
    pub passed: bool,
    pub timed_out: bool,
    pub expected: String,
    pub actual: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Verdict {
    Accepted,

    #[strum(serialize = "Wrong Answer")]
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
}

/// Immutable record of one full-judge pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub username: String,
    pub problem_id: ProblemId,
    pub code: String,
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
}

/// Submission data before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub username: String,
    pub problem_id: ProblemId,
    pub code: String,
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn verdict_display_should_match_persisted_strings() {
        assert_eq!(Verdict::Accepted.to_string(), "Accepted");
        assert_eq!(Verdict::WrongAnswer.to_string(), "Wrong Answer");
    }

    #[test]
    fn verdict_should_parse_back_from_display() {
        assert_eq!(Verdict::from_str("Accepted").unwrap(), Verdict::Accepted);
        assert_eq!(
            Verdict::from_str("Wrong Answer").unwrap(),
            Verdict::WrongAnswer
        );
    }

    #[test]
    fn testcase_hidden_should_default_to_false_in_toml() {
        let t: TestCase = toml::from_str(
            r#"
            input = "2 3"
            output = "5"
            "#,
        )
        .unwrap();
        assert_eq!(t.expected_output, "5");
        assert!(!t.hidden);
    }
}
