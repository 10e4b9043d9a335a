//! Beryl Solidifier
//!
//! Serializes a live Beryl object graph — a closure, a class, or a whole
//! module — into C source text that, compiled and linked with the VM
//! runtime, reconstructs the same objects as read-only constants. Work
//! that would otherwise happen at every interpreter start (parsing,
//! compiling, allocating, interning) is moved to build time, and the
//! frozen objects cost zero RAM on constrained targets.
//!
//! The emitter walks the graph once, in strict document order, writing
//! constructor macros (`be_nested_proto`, `be_local_closure`,
//! `be_local_class`, ...) whose names are the stable contract with the C
//! runtime. Output produced before an error stays on the sink; there is
//! no rollback.
//!
//! # Example
//!
//! ```rust,ignore
//! use beryl_solidify::{dump_to_string, DumpOptions};
//!
//! // `module` was built by the compiler or captured from a running VM
//! let options = DumpOptions::new().with_literal_strings(true);
//! let c_source = dump_to_string(&module, &options)?;
//! std::fs::write("be_mymodule.c", c_source)?;
//! ```
//!
//! # What is serializable
//!
//! Closures must carry no live upvalues, instances must be plain `bytes`
//! / `map` / `list` data carriers, map keys must be strings or integers,
//! and bytecode may only reference builtin globals. Violations surface as
//! [`SolidifyError`] values; the upvalue rule is the one soft exception
//! (an inline marker is emitted and the walk continues).

mod emit;
pub mod error;
pub mod ident;
pub mod sink;

pub use error::SolidifyError;

use beryl_core::Value;
use std::io;

/// Options for one dump.
///
/// Builder-style, in the manner of the compiler's configuration types.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Use the weak (string-literal) constructor family instead of
    /// references into the runtime's interned string table
    pub literal_strings: bool,
    /// Naming scope for top-level closures. Flows only into closure
    /// emission; classes and modules name themselves.
    pub prefix: String,
}

impl DumpOptions {
    pub fn new() -> Self {
        DumpOptions::default()
    }

    pub fn with_literal_strings(mut self, literal: bool) -> Self {
        self.literal_strings = literal;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Solidify `value` into `out`.
///
/// `value` must be a closure, class, or module; anything else is a
/// [`SolidifyError::Value`].
pub fn dump(
    value: &Value,
    options: &DumpOptions,
    out: &mut dyn io::Write,
) -> Result<(), SolidifyError> {
    let mut solidifier = emit::Solidifier::new(out, options.literal_strings);
    match value {
        Value::Closure(c) => solidifier.emit_closure(c, &options.prefix),
        Value::Class(cl) => solidifier.emit_class(cl),
        Value::Module(m) => solidifier.emit_module(m),
        other => Err(SolidifyError::Value(format!(
            "closure, class, or module expected, got {}",
            other.type_name()
        ))),
    }
}

/// Solidify into a `String` (emitted text is ASCII)
pub fn dump_to_string(value: &Value, options: &DumpOptions) -> Result<String, SolidifyError> {
    let mut buf = Vec::new();
    dump(value, options, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Solidify to the process stdout, the default sink when the embedder
/// hands over no file of its own
pub fn dump_to_stdout(value: &Value, options: &DumpOptions) -> Result<(), SolidifyError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    dump(value, options, &mut lock)
}
