pub mod sandboxed;
pub mod traits;

pub use sandboxed::SandboxedExecutor;
pub use traits::{ExecutionFailure, Executor};
