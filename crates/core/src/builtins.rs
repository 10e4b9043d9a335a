//! The VM's Global Builtin Table
//!
//! Globals resolved by small-integer index at run time. The order is the
//! registration order of the native functions and is part of the VM's ABI:
//! compiled bytecode addresses builtins by index, so reordering this table
//! invalidates every previously compiled artifact.

/// Builtin names, in registration order
pub const BUILTIN_NAMES: &[&str] = &[
    "assert",
    "print",
    "input",
    "type",
    "classname",
    "classof",
    "number",
    "int",
    "real",
    "str",
    "bool",
    "size",
    "super",
    "module",
    "map",
    "list",
    "range",
    "bytes",
    "compile",
    "call",
    "format",
    "isinstance",
    "issubclass",
    "open",
];

/// Number of builtin globals
pub fn count() -> usize {
    BUILTIN_NAMES.len()
}

/// Name of the builtin at `index`
pub fn name(index: usize) -> Option<&'static str> {
    BUILTIN_NAMES.get(index).copied()
}

/// Index of a builtin by name
pub fn index_of(name: &str) -> Option<usize> {
    BUILTIN_NAMES.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_consistent() {
        for (i, &n) in BUILTIN_NAMES.iter().enumerate() {
            assert_eq!(name(i), Some(n));
            assert_eq!(index_of(n), Some(i));
        }
        assert_eq!(name(count()), None);
        assert_eq!(index_of("no-such-builtin"), None);
    }
}
