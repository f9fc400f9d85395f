use std::time::Duration;

use crate::error::Result;
use crate::judging::compare::{normalize_input, outputs_match};
use crate::model::{CaseOutcome, TestCase};
use crate::sandbox::Sandbox;

/// Drives the sandbox and comparator across an ordered list of test
/// cases for one (code, problem) pair. Reports facts per case and
/// nothing else; verdict aggregation belongs to [`crate::judge::Judge`].
#[derive(Debug, Clone)]
pub struct CaseRunner<'a> {
    sandbox: &'a Sandbox,
    time_limit: Duration,
}

impl<'a> CaseRunner<'a> {
    pub fn new(sandbox: &'a Sandbox, time_limit: Duration) -> Self {
        Self {
            sandbox,
            time_limit,
        }
    }

    /// Evaluates every case in stored order, never short-circuiting:
    /// the report must show all outcomes even after a failure.
    pub async fn run_cases(&self, code: &str, cases: &[TestCase]) -> Result<Vec<CaseOutcome>> {
        let mut outcomes = Vec::with_capacity(cases.len());
        for (i, case) in cases.iter().enumerate() {
            let stdin = normalize_input(&case.input);
            let res = self.sandbox.execute(code, &stdin, self.time_limit).await?;
            let passed = !res.timed_out && outputs_match(&res.stdout, &case.expected_output);
            log::debug!(
                "Case {}: passed={} timed_out={} [{}ms]",
                i + 1,
                passed,
                res.timed_out,
                res.execution_time.as_millis()
            );
            outcomes.push(CaseOutcome {
                index: i + 1,
                passed,
                timed_out: res.timed_out,
                expected: case.expected_output.clone(),
                actual: res.stdout,
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase {
            input: input.into(),
            expected_output: expected.into(),
            hidden: false,
        }
    }

    async fn run(code: &str, cases: &[TestCase]) -> Vec<CaseOutcome> {
        let sandbox = Sandbox::new(2);
        CaseRunner::new(&sandbox, Duration::from_secs(3))
            .run_cases(code, cases)
            .await
            .unwrap()
    }

    const ECHO: &str = "import sys; sys.stdout.write(sys.stdin.read())";

    #[tokio::test]
    async fn echo_program_should_pass_when_expected_equals_input() {
        let outcomes = run(ECHO, &[case("2 3\n", "2 3"), case("10 20", "10 20\n")]).await;
        assert!(outcomes.iter().all(|o| o.passed));
    }

    #[tokio::test]
    async fn should_keep_stored_order_and_one_based_indices() {
        let cases = vec![case("1\n", "1"), case("2\n", "2"), case("3\n", "3")];
        let outcomes = run(ECHO, &cases).await;
        assert_eq!(
            outcomes.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(outcomes[1].expected, "2");
    }

    #[tokio::test]
    async fn should_continue_past_failures() {
        let sum = r#"print(sum(map(int, input().split())))"#;
        let cases = vec![case("2 3\n", "999"), case("10 20\n", "30"), case("1 1\n", "0")];
        let outcomes = run(sum, &cases).await;
        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].passed);
        assert!(outcomes[1].passed);
        assert!(!outcomes[2].passed);
    }

    #[tokio::test]
    async fn should_normalize_authored_input_before_execution() {
        // Reads exactly two lines; fails unless CRLF input was normalized
        // and the missing trailing newline was appended.
        let two_lines = r#"a = input(); b = input(); print(a + "," + b)"#;
        let outcomes = run(two_lines, &[case("x\r\ny", "x,y")]).await;
        assert!(outcomes[0].passed, "actual = {:?}", outcomes[0].actual);
    }

    #[tokio::test]
    async fn timed_out_case_should_fail_but_not_abort_the_run() {
        let sandbox = Sandbox::new(2);
        let runner = CaseRunner::new(&sandbox, Duration::from_millis(300));
        let looping = "while True: pass";
        let cases = vec![case("", ""), case("", "")];
        let outcomes = runner.run_cases(looping, &cases).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.timed_out && !o.passed));
    }

    #[tokio::test]
    async fn runtime_error_output_is_still_the_comparison_target() {
        // Prints the right answer, then crashes. The stdout text is what
        // gets compared; the crash shows up only via the sandbox result.
        let code = r#"print("5"); raise RuntimeError("boom")"#;
        let outcomes = run(code, &[case("", "5")]).await;
        assert!(outcomes[0].passed);
    }

    #[tokio::test]
    async fn empty_case_list_should_yield_empty_outcomes() {
        let outcomes = run(ECHO, &[]).await;
        assert!(outcomes.is_empty());
    }
}
