//! In-process execution of untrusted Python snippets with optional
//! verification of their output against an expected value.
//!
//! Code goes through three gates before a result comes back: a lexical
//! policy filter over a deny-list of dangerous tokens, a restricted
//! interpreter environment whose builtins are pruned to a small allow-list,
//! and a wall-clock deadline enforced from outside the interpreter.
//!
//! This is a best-effort language-level sandbox, not OS-level isolation.
//! It raises the bar against accidental and casual misuse; a determined
//! adversary with arbitrary code should be confined by process-level
//! mechanisms on top of it. The memory ceiling in particular is advisory
//! only, see [`executor::SandboxedExecutor`].

pub mod compare;
pub mod domain;
pub mod executor;
pub mod policy;
pub mod sandbox;
pub mod stubs;
pub mod tool;

pub use domain::{ExecutionReport, ExecutionRequest, ResourceLimits, SandboxCapabilities};
pub use executor::{Executor, SandboxedExecutor};
pub use tool::CodeExecutionTool;
