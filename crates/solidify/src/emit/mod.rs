//! Constructor-Text Emission
//!
//! The recursive descent over the object graph, split into focused
//! submodules, one per value shape:
//!
//! - `value.rs`: tag dispatch, maps, lists, instances
//! - `proto.rs`: function prototypes (header, upvalues, sub-prototypes,
//!   constants, bytecode)
//! - `closure.rs`: closures, borrowed-method detection, inner classes
//! - `class.rs`: classes and their member tables
//! - `module.rs`: module tables
//!
//! Everything writes through the [`Sink`]; no emission site buffers text
//! of its own. Emitted macro names (`be_nested_proto`, `be_const_key`,
//! `be_local_closure`, ...) are the contract between generated text and
//! the C runtime and are reproduced here verbatim.

mod class;
mod closure;
mod module;
mod proto;
mod value;

use crate::error::SolidifyError;
use crate::ident;
use crate::sink::Sink;
use beryl_core::map::NEXT_NIL;
use beryl_core::{BerylString, Class, MapKey};
use std::collections::HashSet;
use std::io;

/// Strings at or above this length take the raw (unformatted) sink path
const LONG_STRING_LEN: usize = 255;

/// Traversal state for one dump.
///
/// `literal` selects the weak constructor family: string constants are
/// emitted as literals instead of references into the runtime's interned
/// string table, so the output links even when the strings are not known
/// to the target build.
///
/// `emitted_classes` records every class already defined on this sink,
/// by identity: one class may be referenced from any number of constant
/// tables, but its `be_local_class` definition must appear exactly once.
pub(crate) struct Solidifier<'w> {
    pub(crate) sink: Sink<'w>,
    pub(crate) literal: bool,
    pub(crate) emitted_classes: HashSet<*const Class>,
}

impl<'w> Solidifier<'w> {
    pub(crate) fn new(out: &'w mut dyn io::Write, literal: bool) -> Self {
        Solidifier {
            sink: Sink::new(out),
            literal,
            emitted_classes: HashSet::new(),
        }
    }

    /// A string as a value: `be_nested_str[_weak](ident)`, or the
    /// three-write `be_nested_str_long` form for strings long enough to
    /// overrun the formatted line buffer.
    pub(super) fn emit_str_value(&mut self, s: &BerylString) -> Result<(), SolidifyError> {
        let id = ident::encode(s.as_bytes());
        if s.len() >= LONG_STRING_LEN {
            self.sink.write_raw(b"be_nested_str_long(")?;
            self.sink.write_raw(id.as_bytes())?;
            self.sink.write_raw(b")")?;
        } else if self.literal {
            write!(self.sink, "be_nested_str_weak({})", id)?;
        } else {
            write!(self.sink, "be_nested_str({})", id)?;
        }
        Ok(())
    }

    /// A string as a name argument: a reference into the interned table
    /// (`&be_const_str_ident`) or its weak counterpart.
    pub(super) fn emit_str_ref(&mut self, s: &BerylString) -> Result<(), SolidifyError> {
        let id = ident::encode(s.as_bytes());
        if self.literal {
            write!(self.sink, "be_str_weak({})", id)?;
        } else {
            write!(self.sink, "&be_const_str_{}", id)?;
        }
        Ok(())
    }

    /// A map key with its chain link
    pub(super) fn emit_key(&mut self, key: &MapKey, next: u32) -> Result<(), SolidifyError> {
        let link: i64 = if next == NEXT_NIL { -1 } else { next as i64 };
        match key {
            MapKey::Str(s) => {
                let id = ident::encode(s.as_bytes());
                if self.literal {
                    write!(self.sink, "be_const_key_weak({}, {})", id, link)?;
                } else {
                    write!(self.sink, "be_const_key({}, {})", id, link)?;
                }
            }
            MapKey::Int(i) => {
                write!(self.sink, "be_const_key_int({}, {})", i, link)?;
            }
            other => {
                return Err(SolidifyError::Internal(format!(
                    "unsupported type in key: {:?}",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Banner comment above a solidified definition
    pub(super) fn emit_banner(&mut self, kind: &str, name: &BerylString) -> Result<(), SolidifyError> {
        writeln!(
            self.sink,
            "/********************************************************************"
        )?;
        writeln!(self.sink, "** Solidified {}: {}", kind, name)?;
        writeln!(
            self.sink,
            "********************************************************************/"
        )?;
        Ok(())
    }

    /// Closing rule after a solidified definition
    pub(super) fn emit_footer(&mut self) -> Result<(), SolidifyError> {
        writeln!(
            self.sink,
            "/*******************************************************************/"
        )?;
        writeln!(self.sink)?;
        Ok(())
    }
}
