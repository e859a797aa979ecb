use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tokio::time::timeout;

use crate::domain::{ExecutionOutcome, ResourceLimits, SandboxCapabilities};
use crate::executor::traits::{ExecutionFailure, Executor};
use crate::policy;
use crate::sandbox::{run_sandboxed, CaptureBuffer};

/// Deadline-enforced executor over the restricted in-process VM.
///
/// Executions are strictly serialized per instance: the deadline watchdog
/// cannot kill a worker thread, only abandon it, so at most one sandbox is
/// admitted at a time and callers wanting parallelism run several isolated
/// instances. An abandoned worker keeps its thread until the code it runs
/// terminates on its own; code that never does (a hot loop, say) leaves the
/// thread spinning for the process lifetime, and repeated timeouts
/// accumulate such threads. Admission is serialized per instance only, so
/// the next execution can start while an abandoned worker still runs.
///
/// The memory ceiling in [`ResourceLimits`] is a documented no-op: an
/// in-process executor cannot apply an address-space limit without
/// constraining its own host. [`Executor::capabilities`] reports this instead
/// of implying a guarantee; a `MemoryError` raised inside the VM is still
/// mapped to the memory-exhaustion outcome.
#[derive(Debug)]
pub struct SandboxedExecutor {
    limits: ResourceLimits,
    inflight: Mutex<()>,
}

impl SandboxedExecutor {
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            inflight: Mutex::new(()),
        }
    }

    pub fn limits(&self) -> ResourceLimits {
        self.limits
    }
}

impl Default for SandboxedExecutor {
    fn default() -> Self {
        Self::new(ResourceLimits::default())
    }
}

#[async_trait]
impl Executor for SandboxedExecutor {
    #[tracing::instrument(skip(code), fields(code_len = code.len()))]
    async fn execute(&self, code: &str) -> ExecutionOutcome {
        if code.trim().is_empty() {
            return ExecutionOutcome::failure(ExecutionFailure::InvalidInput.to_string(), 0);
        }

        if let Err(violation) = policy::screen(code) {
            tracing::warn!(token = %violation.token, "policy filter rejected code");
            return ExecutionOutcome::failure(violation.to_string(), 0);
        }

        let _guard = self.inflight.lock().await;

        let buffer = CaptureBuffer::new();
        let worker_buffer = buffer.clone();
        let owned_code = code.to_owned();
        let deadline = Duration::from_secs(self.limits.time_limit_secs);
        let started = Instant::now();

        // A detached thread rather than spawn_blocking: the runtime waits for
        // blocking-pool tasks on shutdown, and an abandoned worker must never
        // hold the runtime hostage.
        let (result_tx, result_rx) = oneshot::channel();
        std::thread::spawn(move || {
            let run = run_sandboxed(&owned_code, &worker_buffer);
            let _ = result_tx.send(run);
        });

        match timeout(deadline, result_rx).await {
            Err(_) => {
                // The worker thread cannot be interrupted; it is abandoned and
                // its buffer snapshot keeps whatever it printed so far.
                tracing::warn!(
                    seconds = self.limits.time_limit_secs,
                    "execution deadline exceeded, abandoning worker"
                );
                let (stdout, stderr) = buffer.snapshot();
                ExecutionOutcome::failure_with_output(
                    ExecutionFailure::Timeout {
                        seconds: self.limits.time_limit_secs,
                    }
                    .to_string(),
                    stdout,
                    stderr,
                    elapsed_ms(started),
                )
            }
            Ok(Err(_recv_error)) => {
                // Sender dropped without a result: the worker panicked.
                tracing::error!("sandbox worker terminated without a result");
                let (stdout, stderr) = buffer.snapshot();
                ExecutionOutcome::failure_with_output(
                    ExecutionFailure::Runtime {
                        kind: "Panic".to_string(),
                        detail: "sandbox worker terminated unexpectedly".to_string(),
                    }
                    .to_string(),
                    stdout,
                    stderr,
                    elapsed_ms(started),
                )
            }
            Ok(Ok(run)) => {
                let duration_ms = elapsed_ms(started);
                match run.fault {
                    None => {
                        tracing::debug!(duration_ms, "execution completed");
                        ExecutionOutcome::success(run.stdout, run.stderr, duration_ms)
                    }
                    Some(fault) => {
                        tracing::debug!(duration_ms, fault = %fault, "execution faulted");
                        ExecutionOutcome::failure_with_output(
                            fault.to_string(),
                            run.stdout,
                            run.stderr,
                            duration_ms,
                        )
                    }
                }
            }
        }
    }

    fn capabilities(&self) -> SandboxCapabilities {
        SandboxCapabilities {
            time_limit_enforced: true,
            memory_limit_enforced: false,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
