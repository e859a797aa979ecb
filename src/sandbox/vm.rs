//! Embedded interpreter plumbing: one fresh VM per execution, restricted
//! builtins, and per-call output capture.
//!
//! `sys.stdout`/`sys.stderr` are replaced inside each fresh interpreter with
//! writer objects backed by a per-call [`CaptureBuffer`], so capture is scoped
//! to the interpreter's lifetime instead of swapping process-global streams.
//! The buffers are read on every exit path, fault or not.

use std::sync::{Arc, Mutex, MutexGuard};

use rustpython_vm::{
    builtins::PyBaseExceptionRef, compiler::Mode, function::FuncArgs, AsObject, Interpreter,
    PyObjectRef, PyResult, Settings, VirtualMachine,
};

use crate::executor::traits::ExecutionFailure;
use crate::sandbox::env::restriction_prelude;

/// Per-call sink for everything the sandboxed code writes. Cloning shares the
/// underlying buffers, which lets the executor read partial output even when
/// the worker holding the other clone is abandoned on timeout.
#[derive(Clone, Debug, Default)]
pub struct CaptureBuffer {
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_stdout(&self, data: &str) {
        lock(&self.stdout).push_str(data);
    }

    fn push_stderr(&self, data: &str) {
        lock(&self.stderr).push_str(data);
    }

    /// Current contents of both streams.
    pub fn snapshot(&self) -> (String, String) {
        (lock(&self.stdout).clone(), lock(&self.stderr).clone())
    }
}

fn lock(buffer: &Mutex<String>) -> MutexGuard<'_, String> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Everything a single VM run produced.
#[derive(Clone, Debug)]
pub struct SandboxRun {
    pub stdout: String,
    pub stderr: String,
    pub fault: Option<ExecutionFailure>,
}

/// Runs one code snippet in a fresh, restricted interpreter. Blocking; the
/// executor is responsible for the deadline and for offloading this onto a
/// worker thread.
pub fn run_sandboxed(code: &str, buffer: &CaptureBuffer) -> SandboxRun {
    let interpreter = Interpreter::without_stdlib(Settings::default());
    let result = interpreter.enter(|vm| execute_in_vm(vm, code, buffer));

    // Unconditional on every path; the interpreter and its writers are
    // dropped right after, nothing global to restore.
    let (stdout, stderr) = buffer.snapshot();
    SandboxRun {
        stdout,
        stderr,
        fault: result.err(),
    }
}

fn execute_in_vm(
    vm: &VirtualMachine,
    code: &str,
    buffer: &CaptureBuffer,
) -> Result<(), ExecutionFailure> {
    install_output_capture(vm, buffer);
    apply_restrictions(vm)?;

    let code_obj = vm
        .compile(code, Mode::Exec, "<sandbox>".to_owned())
        .map_err(|err| ExecutionFailure::Syntax {
            detail: err.to_string(),
        })?;

    let scope = vm.new_scope_with_builtins();
    match vm.run_code_obj(code_obj, scope) {
        Ok(_) => Ok(()),
        Err(exc) => Err(classify_exception(vm, exc)),
    }
}

/// Reduces the interpreter's builtins to the allow-list by running the
/// restriction prelude in a throwaway scope.
fn apply_restrictions(vm: &VirtualMachine) -> Result<(), ExecutionFailure> {
    let prelude = restriction_prelude();
    let code_obj = vm
        .compile(&prelude, Mode::Exec, "<sandbox-setup>".to_owned())
        .map_err(|err| ExecutionFailure::Runtime {
            kind: "SandboxSetup".to_owned(),
            detail: err.to_string(),
        })?;

    let scope = vm.new_scope_with_builtins();
    vm.run_code_obj(code_obj, scope)
        .map(drop)
        .map_err(|exc| match classify_exception(vm, exc) {
            ExecutionFailure::Runtime { kind, detail } => ExecutionFailure::Runtime {
                kind: "SandboxSetup".to_owned(),
                detail: format!("{kind}: {detail}"),
            },
            other => other,
        })
}

fn classify_exception(vm: &VirtualMachine, exc: PyBaseExceptionRef) -> ExecutionFailure {
    let kind = exception_kind(vm, &exc);
    if kind == "MemoryError" {
        return ExecutionFailure::MemoryExceeded;
    }
    let detail = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_else(|_| "unprintable exception".to_owned());
    ExecutionFailure::Runtime { kind, detail }
}

fn exception_kind(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> String {
    let class: PyObjectRef = exc.class().to_owned().into();
    class
        .get_attr("__name__", vm)
        .ok()
        .and_then(|name| name.str(vm).ok())
        .map(|name| name.as_str().to_owned())
        .unwrap_or_else(|| "Exception".to_owned())
}

/// Replaces `sys.stdout` and `sys.stderr` with objects whose `write` feeds
/// the capture buffer. `print` goes through `sys.stdout.write`, so this
/// catches all permitted output.
fn install_output_capture(vm: &VirtualMachine, buffer: &CaptureBuffer) {
    let stdout = writer_object(vm, buffer.clone(), false);
    let stderr = writer_object(vm, buffer.clone(), true);
    let _ = vm.sys_module.set_attr("stdout", stdout, vm);
    let _ = vm.sys_module.set_attr("stderr", stderr, vm);
}

/// Minimal file-like namespace with `write(s)` and `flush()`.
fn writer_object(vm: &VirtualMachine, buffer: CaptureBuffer, is_stderr: bool) -> PyObjectRef {
    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let data = args
                .args
                .first()
                .and_then(|obj| obj.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();
            if is_stderr {
                buffer.push_stderr(&data);
            } else {
                buffer.push_stdout(&data);
            }
            Ok(vm.ctx.new_int(data.len()).into())
        },
    );

    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            Ok(vm.ctx.none())
        },
    );

    let namespace = vm.new_module("<capture>", vm.ctx.new_dict(), None);
    let _ = namespace.set_attr("write", write_fn, vm);
    let _ = namespace.set_attr("flush", flush_fn, vm);
    let _ = namespace.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = namespace.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);
    namespace.into()
}
