//! Static pre-execution screen over the raw code text.
//!
//! This is a textual heuristic, not semantic analysis. It over-blocks (a
//! denied token inside a comment or string literal still rejects the code,
//! and short tokens like `os` match inside unrelated words such as `close`)
//! and under-blocks (a capability reached through an alias the list does not
//! name passes the screen). It is a cheap first filter; the restricted
//! builtins namespace is what actually withholds the capabilities at runtime.

use thiserror::Error;

/// Tokens naming capabilities the sandbox must never expose: process,
/// filesystem and network modules, dynamic evaluation primitives, and
/// interactive input.
pub const BLOCKED_TOKENS: &[&str] = &[
    "os",
    "subprocess",
    "sys",
    "socket",
    "urllib",
    "requests",
    "shutil",
    "pickle",
    "shelve",
    "__import__",
    "eval",
    "exec",
    "compile",
    "open",
    "file",
    "input",
    "raw_input",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Blocked operation detected: {token}")]
pub struct PolicyViolation {
    pub token: String,
}

/// Rejects code that textually contains a denied token, case-insensitively.
/// First match wins. Pure function; never touches the sandbox.
pub fn screen(code: &str) -> Result<(), PolicyViolation> {
    let lowered = code.to_lowercase();
    for token in BLOCKED_TOKENS {
        if lowered.contains(token) {
            return Err(PolicyViolation {
                token: (*token).to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_code_passes() {
        assert_eq!(screen("print(2 + 2)"), Ok(()));
        assert_eq!(screen("total = sum(range(10))"), Ok(()));
    }

    #[test]
    fn import_os_is_rejected() {
        let err = screen("import os").unwrap_err();
        assert_eq!(err.token, "os");
        assert_eq!(err.to_string(), "Blocked operation detected: os");
    }

    #[test]
    fn every_token_is_rejected_when_present() {
        for token in BLOCKED_TOKENS {
            assert!(screen(token).is_err(), "token {token} passed the screen");
        }
    }

    #[test]
    fn screen_is_case_insensitive() {
        assert!(screen("import Subprocess").is_err());
        assert!(screen("EVAL('1')").is_err());
    }

    #[test]
    fn substring_scan_over_blocks_unrelated_words() {
        // Documented imprecision: "close" contains "os".
        let err = screen("handle.close()").unwrap_err();
        assert_eq!(err.token, "os");
    }

    #[test]
    fn tokens_in_string_literals_still_reject() {
        assert!(screen("print('eval is a word')").is_err());
    }
}
