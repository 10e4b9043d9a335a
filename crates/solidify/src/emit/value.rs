//! Value Dispatch, Maps, Lists, Instances
//!
//! One constructor form per value tag. Every form is emitted with no
//! leading indentation, no trailing comma, and no trailing newline; call
//! sites own the surrounding layout. Unknown tags are an error, never a
//! silent skip.

use super::Solidifier;
use crate::error::SolidifyError;
use crate::ident;
use beryl_core::class::ClassKind;
use beryl_core::list::List;
use beryl_core::map::{Map, MapKey};
use beryl_core::value::{NativePayload, Value};
use beryl_core::Instance;

impl Solidifier<'_> {
    /// Emit one complete constructor form for `v`.
    ///
    /// `prefix` is the enclosing naming scope (a `class_Name`, a caller
    /// prefix, or empty); `key` is the member name under which `v` was
    /// reached, used to name native symbols.
    pub(crate) fn emit_value(
        &mut self,
        v: &Value,
        prefix: &str,
        key: &str,
    ) -> Result<(), SolidifyError> {
        match v {
            Value::Nil => write!(self.sink, "be_const_nil()")?,
            Value::Bool(b) => write!(self.sink, "be_const_bool({})", *b as u8)?,
            Value::Int(i) => write!(self.sink, "be_const_int({})", i)?,
            Value::Index(i) => write!(self.sink, "be_const_var({})", i)?,
            Value::Real(r) => self.emit_real(*r)?,
            Value::Str(s) => self.emit_str_value(s)?,
            Value::Closure(c) => {
                let id = ident::encode(c.proto.name.as_bytes());
                let scope = match c.proto.parent() {
                    Some(parent) => format!("class_{}_", ident::encode(parent.name.as_bytes())),
                    None if !prefix.is_empty() => format!("{}_", prefix),
                    None => String::new(),
                };
                let ctor = if c.is_static {
                    "be_const_static_closure"
                } else {
                    "be_const_closure"
                };
                write!(self.sink, "{}({}{}_closure)", ctor, scope, id)?;
            }
            Value::Class(cl) => {
                write!(
                    self.sink,
                    "be_const_class(be_class_{})",
                    ident::encode(cl.name.as_bytes())
                )?;
            }
            Value::NativeFunc { is_static } => {
                let ctor = if *is_static {
                    "be_const_static_func"
                } else {
                    "be_const_func"
                };
                write!(self.sink, "{}(be_ntv_{}_{})", ctor, prefix, key)?;
            }
            Value::NativePtr(_) => {
                write!(self.sink, "be_const_comptr(&be_ntv_{}_{})", prefix, key)?;
            }
            Value::Instance(ins) => self.emit_instance(ins, prefix, key)?,
            Value::Map(m) => {
                m.borrow_mut().compact();
                self.emit_map(&m.borrow(), prefix)?;
            }
            Value::List(l) => self.emit_list(&l.borrow(), prefix)?,
            other => {
                return Err(SolidifyError::Internal(format!(
                    "unsupported type in constants: {}",
                    other.type_name()
                )));
            }
        }
        Ok(())
    }

    fn emit_real(&mut self, r: beryl_core::Real) -> Result<(), SolidifyError> {
        #[cfg(not(feature = "single-float"))]
        write!(self.sink, "be_const_real_hex(0x{:016X})", r.to_bits())?;
        #[cfg(feature = "single-float")]
        write!(self.sink, "be_const_real_hex(0x{:08X})", r.to_bits())?;
        Ok(())
    }

    /// Emit a compacted map.
    ///
    /// The slot loop walks the raw array by index: empty slots are
    /// skipped but never shift later slots, so emitted chain links keep
    /// addressing the same positions. Ends with `))` and no trailing
    /// comma; call sites supply their own separators.
    pub(crate) fn emit_map(&mut self, map: &Map, prefix: &str) -> Result<(), SolidifyError> {
        writeln!(self.sink, "be_nested_map({},", map.count())?;
        writeln!(
            self.sink,
            "    ( (struct bmapnode*) &(const bmapnode[]) {{"
        )?;
        for slot in map.slots() {
            let Some(map_key) = &slot.key else { continue };
            write!(self.sink, "        {{ ")?;
            self.emit_key(map_key, slot.next)?;
            write!(self.sink, ", ")?;
            let key_name = match map_key {
                MapKey::Str(s) => ident::encode(s.as_bytes()),
                _ => String::new(),
            };
            self.emit_value(&slot.value, prefix, &key_name)?;
            writeln!(self.sink, " }},")?;
        }
        write!(self.sink, "    }}))")?;
        Ok(())
    }

    /// Emit a list, in source order. Same `))` ending convention as maps.
    pub(crate) fn emit_list(&mut self, list: &List, prefix: &str) -> Result<(), SolidifyError> {
        writeln!(self.sink, "be_nested_list({},", list.len())?;
        writeln!(self.sink, "    ( (struct bvalue*) &(const bvalue[]) {{")?;
        for item in list.iter() {
            write!(self.sink, "        ")?;
            self.emit_value(item, prefix, "")?;
            writeln!(self.sink, ",")?;
        }
        write!(self.sink, "    }}))")?;
        Ok(())
    }

    /// Serializable instances: `bytes` buffers, and the bare `map`/`list`
    /// helper wrappers. Anything else is not representable as a constant.
    fn emit_instance(
        &mut self,
        ins: &Instance,
        prefix: &str,
        key: &str,
    ) -> Result<(), SolidifyError> {
        match ins.class.kind {
            ClassKind::Bytes => self.emit_bytes_instance(ins),
            ClassKind::Map | ClassKind::List => {
                if ins.super_.is_some() || ins.sub.is_some() {
                    return Err(SolidifyError::Internal(
                        "instance must not have super/sub".to_string(),
                    ));
                }
                let class_name = if ins.class.kind == ClassKind::Map {
                    "map"
                } else {
                    "list"
                };
                writeln!(
                    self.sink,
                    "be_const_simple_instance(be_nested_simple_instance(&be_class_{}, {{",
                    class_name
                )?;
                write!(self.sink, "    be_const_{}( * ", class_name)?;
                match (ins.class.kind, ins.members.first()) {
                    (ClassKind::Map, Some(member)) if matches!(member, Value::Map(_)) => {
                        self.emit_value(member, prefix, key)?;
                    }
                    (ClassKind::List, Some(member)) if matches!(member, Value::List(_)) => {
                        self.emit_value(member, prefix, key)?;
                    }
                    _ => {
                        return Err(SolidifyError::Internal(format!(
                            "simple {} instance without matching payload",
                            class_name
                        )));
                    }
                }
                write!(self.sink, ") }}))")?;
                Ok(())
            }
            ClassKind::User => Err(SolidifyError::Internal(format!(
                "unsupported class: {}",
                ins.class.name
            ))),
        }
    }

    /// Hex-dump the buffer of a `bytes` instance: storage at member slot
    /// 0, significant length at slot 1.
    fn emit_bytes_instance(&mut self, ins: &Instance) -> Result<(), SolidifyError> {
        let (buf, len) = match (ins.members.first(), ins.members.get(1)) {
            (Some(Value::NativePtr(NativePayload::Buffer(buf))), Some(Value::Int(len))) => {
                (buf, *len as usize)
            }
            _ => {
                return Err(SolidifyError::Internal(
                    "bytes instance without buffer/length members".to_string(),
                ));
            }
        };
        if len > buf.len() {
            return Err(SolidifyError::Internal(
                "bytes instance length exceeds buffer".to_string(),
            ));
        }
        write!(self.sink, "be_const_bytes_instance(")?;
        // The dump is unbounded; take the raw path like long strings
        self.sink.write_raw(hex::encode_upper(&buf[..len]).as_bytes())?;
        write!(self.sink, ")")?;
        Ok(())
    }
}
