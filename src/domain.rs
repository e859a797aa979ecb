use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured input accepted by the execution facade.
///
/// The facade parses its raw string input into this shape; when parsing fails
/// the whole input is treated as bare code instead (see
/// [`crate::tool::CodeExecutionTool::execute_and_compare`]).
#[derive(Clone, Debug, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default = "default_compare_mode")]
    pub compare_mode: String,
}

fn default_compare_mode() -> String {
    "exact".to_string()
}

/// What a single sandboxed execution attempt produced.
///
/// Created exactly once per attempt and never mutated afterwards; nothing in
/// it is shared with other requests.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub succeeded: bool,
    pub message: String,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn success(stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            stdout,
            stderr,
            succeeded: true,
            message: "Code executed successfully".to_string(),
            duration_ms,
        }
    }

    pub fn failure(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            succeeded: false,
            message: message.into(),
            duration_ms,
        }
    }

    /// Failure that still carries whatever output was captured before the
    /// fault (timeouts and runtime errors can produce partial output).
    pub fn failure_with_output(
        message: impl Into<String>,
        stdout: String,
        stderr: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            stdout,
            stderr,
            succeeded: false,
            message: message.into(),
            duration_ms,
        }
    }
}

/// Verdict of checking actual output against an expected output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub mode: String,
    #[serde(rename = "match")]
    pub matched: bool,
    pub similarity: f64,
    pub details: String,
}

/// Aggregate record returned to the tool dispatch layer.
///
/// Field names follow the tool-boundary contract: `execution_success`,
/// `output`, `errors`, `message`, plus `expected_output`/`comparison` when a
/// verification was requested.
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionReport {
    pub id: Uuid,
    pub executed_at: DateTime<Utc>,
    pub code: String,
    pub execution_success: bool,
    pub output: String,
    pub errors: String,
    pub message: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

/// Executor configuration, fixed at construction time. Limits are not
/// tunable per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLimits {
    pub time_limit_secs: u64,
    pub memory_limit_bytes: u64,
}

impl ResourceLimits {
    /// The memory limit is given in MiB. Both limits are clamped to at least
    /// 1: a zero time limit would time out every execution before it starts.
    pub fn new(time_limit_secs: u64, memory_limit_mb: u64) -> Self {
        Self {
            time_limit_secs: time_limit_secs.max(1),
            memory_limit_bytes: memory_limit_mb.max(1) * 1024 * 1024,
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::new(5, 50)
    }
}

/// Which of the configured ceilings the executor actually enforces on this
/// platform. Callers should consult this instead of assuming both limits are
/// live guarantees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SandboxCapabilities {
    pub time_limit_enforced: bool,
    pub memory_limit_enforced: bool,
}
