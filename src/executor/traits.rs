use thiserror::Error;

use crate::domain::{ExecutionOutcome, SandboxCapabilities};

/// Seam between the facade and the sandbox. Mocked in facade tests; the real
/// implementation is [`crate::executor::SandboxedExecutor`].
#[mockall::automock]
#[async_trait::async_trait]
pub trait Executor: std::fmt::Debug + Send + Sync {
    /// Runs one code snippet and always returns a structured outcome; no
    /// fault escapes as an error or panic.
    async fn execute(&self, code: &str) -> ExecutionOutcome;

    /// Which configured ceilings are actually enforced on this platform.
    fn capabilities(&self) -> SandboxCapabilities;
}

/// Everything that can terminate an execution attempt short of success.
/// Each variant's display string is the outcome `message` the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("Invalid code input")]
    InvalidInput,

    #[error("Blocked operation detected: {token}")]
    Blocked { token: String },

    #[error("Syntax error: {detail}")]
    Syntax { detail: String },

    #[error("Code execution exceeded {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Memory limit exceeded")]
    MemoryExceeded,

    #[error("Execution error: {kind}: {detail}")]
    Runtime { kind: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_match_the_wire_contract() {
        assert_eq!(ExecutionFailure::InvalidInput.to_string(), "Invalid code input");
        assert_eq!(
            ExecutionFailure::Blocked {
                token: "os".to_string()
            }
            .to_string(),
            "Blocked operation detected: os"
        );
        assert_eq!(
            ExecutionFailure::Timeout { seconds: 5 }.to_string(),
            "Code execution exceeded 5 seconds"
        );
        assert_eq!(
            ExecutionFailure::MemoryExceeded.to_string(),
            "Memory limit exceeded"
        );
        assert_eq!(
            ExecutionFailure::Syntax {
                detail: "invalid syntax".to_string()
            }
            .to_string(),
            "Syntax error: invalid syntax"
        );
        assert_eq!(
            ExecutionFailure::Runtime {
                kind: "ZeroDivisionError".to_string(),
                detail: "division by zero".to_string()
            }
            .to_string(),
            "Execution error: ZeroDivisionError: division by zero"
        );
    }
}
