//! Public entry point consumed by the tool dispatch layer.
//!
//! Input is first tried as a structured JSON request; anything that fails to
//! parse is executed literally as code. That downgrade is deliberate and
//! silent: malformed structured input is "not structured", never an error.
//! The facade never returns an error or panics past its boundary; every
//! failure is data in the returned report.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::compare::compare_outputs;
use crate::domain::{ExecutionOutcome, ExecutionReport, ExecutionRequest};
use crate::executor::{Executor, SandboxedExecutor};

#[derive(Clone, Debug)]
pub struct CodeExecutionTool {
    executor: Arc<dyn Executor>,
}

impl CodeExecutionTool {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Tool with the stock sandboxed executor (5 s / 50 MiB defaults).
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(SandboxedExecutor::default()))
    }

    /// Executes a structured request, or the whole input as raw code when it
    /// does not parse as one.
    #[tracing::instrument(skip(input), fields(input_len = input.len()))]
    pub async fn execute_and_compare(&self, input: &str) -> ExecutionReport {
        match serde_json::from_str::<ExecutionRequest>(input) {
            Ok(request) => {
                tracing::debug!(code_len = request.code.len(), "structured request");
                self.execute_request(request).await
            }
            Err(_) => {
                tracing::debug!("input is not a structured request, treating as raw code");
                self.execute_simple(input).await
            }
        }
    }

    /// Raw code execution without output verification.
    pub async fn execute_simple(&self, code: &str) -> ExecutionReport {
        let outcome = self.executor.execute(code).await;
        build_report(code.to_string(), outcome, None, "exact")
    }

    /// The `tool_function(input) -> map` boundary: a JSON object with
    /// `code`, `execution_success`, `output`, `errors`, `message`, and when
    /// applicable `expected_output` and `comparison`.
    pub async fn call(&self, input: &str) -> serde_json::Value {
        let report = self.execute_and_compare(input).await;
        serde_json::to_value(&report).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to serialize execution report");
            serde_json::json!({
                "execution_success": false,
                "message": format!("Internal serialization error: {err}"),
            })
        })
    }

    async fn execute_request(&self, request: ExecutionRequest) -> ExecutionReport {
        let outcome = self.executor.execute(&request.code).await;
        build_report(
            request.code,
            outcome,
            request.expected_output,
            &request.compare_mode,
        )
    }
}

fn build_report(
    code: String,
    outcome: ExecutionOutcome,
    expected_output: Option<String>,
    compare_mode: &str,
) -> ExecutionReport {
    // A failed execution never reaches comparison.
    let comparison = match (&expected_output, outcome.succeeded) {
        (Some(expected), true) => Some(compare_outputs(&outcome.stdout, expected, compare_mode)),
        _ => None,
    };

    ExecutionReport {
        id: Uuid::new_v4(),
        executed_at: Utc::now(),
        code,
        execution_success: outcome.succeeded,
        output: outcome.stdout,
        errors: outcome.stderr,
        message: outcome.message,
        duration_ms: outcome.duration_ms,
        expected_output,
        comparison,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ExecutionOutcome;
    use crate::executor::traits::MockExecutor;
    use crate::stubs::ExecutorStub;

    fn tool_with_outcome(outcome: ExecutionOutcome) -> CodeExecutionTool {
        CodeExecutionTool::new(Arc::new(ExecutorStub::new(outcome, Duration::ZERO)))
    }

    #[tokio::test]
    async fn structured_request_with_matching_expected_output() {
        let tool = tool_with_outcome(ExecutionOutcome::success("hi\n".to_string(), String::new(), 7));
        let report = tool
            .execute_and_compare(
                r#"{"code": "print('hi')", "expected_output": "hi", "compare_mode": "exact"}"#,
            )
            .await;

        assert!(report.execution_success);
        assert_eq!(report.code, "print('hi')");
        assert_eq!(report.expected_output.as_deref(), Some("hi"));
        let comparison = report.comparison.expect("comparison should be present");
        assert!(comparison.matched);
        assert_eq!(comparison.similarity, 1.0);
    }

    #[tokio::test]
    async fn failed_execution_never_reaches_comparison() {
        let tool = tool_with_outcome(ExecutionOutcome::failure("Syntax error: boom", 1));
        let report = tool
            .execute_and_compare(r#"{"code": "def broken(:", "expected_output": "4"}"#)
            .await;

        assert!(!report.execution_success);
        assert_eq!(report.expected_output.as_deref(), Some("4"));
        assert!(report.comparison.is_none());
    }

    #[tokio::test]
    async fn comparison_is_absent_without_expected_output() {
        let tool = tool_with_outcome(ExecutionOutcome::success("4\n".to_string(), String::new(), 2));
        let report = tool.execute_and_compare(r#"{"code": "print(4)"}"#).await;

        assert!(report.execution_success);
        assert!(report.comparison.is_none());
        assert!(report.expected_output.is_none());
    }

    #[tokio::test]
    async fn malformed_input_falls_back_to_raw_code() {
        let tool = tool_with_outcome(ExecutionOutcome::success("1\n".to_string(), String::new(), 2));
        let report = tool.execute_and_compare("print(1)").await;

        assert!(report.execution_success);
        assert_eq!(report.code, "print(1)");
        assert!(report.comparison.is_none());
    }

    #[tokio::test]
    async fn unknown_compare_mode_is_reported_in_details() {
        let tool = tool_with_outcome(ExecutionOutcome::success("x\n".to_string(), String::new(), 2));
        let report = tool
            .execute_and_compare(
                r#"{"code": "print('x')", "expected_output": "x", "compare_mode": "approximate"}"#,
            )
            .await;

        let comparison = report.comparison.expect("comparison should be present");
        assert!(!comparison.matched);
        assert_eq!(comparison.details, "Unknown comparison mode: approximate");
    }

    #[tokio::test]
    async fn call_returns_the_wire_map() {
        let tool = tool_with_outcome(ExecutionOutcome::success("hi\n".to_string(), String::new(), 3));
        let value = tool
            .call(r#"{"code": "print('hi')", "expected_output": "hi"}"#)
            .await;

        assert_eq!(value["execution_success"], serde_json::json!(true));
        assert_eq!(value["output"], serde_json::json!("hi\n"));
        assert_eq!(value["errors"], serde_json::json!(""));
        assert_eq!(value["message"], serde_json::json!("Code executed successfully"));
        assert_eq!(value["comparison"]["match"], serde_json::json!(true));
        assert_eq!(value["comparison"]["mode"], serde_json::json!("exact"));
    }

    #[tokio::test]
    async fn executor_receives_the_code_from_the_request() {
        let mut mock = MockExecutor::new();
        mock.expect_execute()
            .withf(|code| code == "print(2 + 2)")
            .times(1)
            .returning(|_| ExecutionOutcome::success("4\n".to_string(), String::new(), 1));

        let tool = CodeExecutionTool::new(Arc::new(mock));
        let report = tool
            .execute_and_compare(r#"{"code": "print(2 + 2)"}"#)
            .await;
        assert!(report.execution_success);
    }
}
