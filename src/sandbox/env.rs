//! Restricted execution namespace: an explicit allow-list of builtins.
//!
//! The sandbox never removes capabilities ad hoc; it enumerates exactly what
//! untrusted code may use. Everything else (file and process access,
//! reflection on the interpreter, dynamic evaluation, imports) is absent from
//! the namespace, so reaching for it raises a plain `NameError` inside the VM.

/// Builtins untrusted code is allowed to call: pure computation, type
/// constructors, iteration helpers, and `print` as the single output
/// primitive.
pub const ALLOWED_BUILTINS: &[&str] = &[
    "abs",
    "all",
    "any",
    "bin",
    "bool",
    "chr",
    "dict",
    "enumerate",
    "filter",
    "float",
    "format",
    "hex",
    "int",
    "isinstance",
    "len",
    "list",
    "map",
    "max",
    "min",
    "ord",
    "pow",
    "print",
    "range",
    "reversed",
    "round",
    "set",
    "sorted",
    "str",
    "sum",
    "tuple",
    "type",
    "zip",
];

/// Python source that reduces the interpreter's builtins to the allow-list.
///
/// Runs once per interpreter, before any user code, inside its own scope.
/// It walks the live builtins table and deletes every entry the allow-list
/// does not name, which covers both ways the VM can resolve builtins (the
/// module object and its backing dict are the same table). Each interpreter
/// is created fresh per execution, so the pruning never outlives a call.
pub fn restriction_prelude() -> String {
    let names = ALLOWED_BUILTINS
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"_allowed = {{{names}}}
_table = __builtins__ if isinstance(__builtins__, dict) else vars(__builtins__)
for _name in list(_table):
    if _name not in _allowed:
        del _table[_name]
del _name, _table, _allowed
"#
    )
}
