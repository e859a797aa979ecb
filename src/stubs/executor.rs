use std::time::Duration;

use crate::domain::{ExecutionOutcome, SandboxCapabilities};
use crate::executor::traits::Executor;

/// Canned executor for wiring tests: always returns the configured outcome
/// after an optional delay.
#[derive(Debug, Clone)]
pub struct ExecutorStub {
    outcome: ExecutionOutcome,
    delay: Duration,
}

impl ExecutorStub {
    pub fn new(outcome: ExecutionOutcome, delay: Duration) -> Self {
        Self { outcome, delay }
    }
}

#[async_trait::async_trait]
impl Executor for ExecutorStub {
    #[tracing::instrument]
    async fn execute(&self, code: &str) -> ExecutionOutcome {
        tracing::debug!("Stub execution: code={:?}", code);
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }

    fn capabilities(&self) -> SandboxCapabilities {
        SandboxCapabilities {
            time_limit_enforced: true,
            memory_limit_enforced: false,
        }
    }
}
