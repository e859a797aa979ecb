pub mod env;
pub mod vm;

pub use vm::{run_sandboxed, CaptureBuffer, SandboxRun};
