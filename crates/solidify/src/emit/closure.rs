//! Closure Emission
//!
//! A closure emits as a `be_local_closure(symbol, <proto>)` definition.
//! The symbol scope comes from the prototype's owning class when there is
//! one, otherwise from the caller's prefix.
//!
//! A closure whose owning class is *not* the class currently being
//! emitted is a borrowed method: some other class owns (and will emit)
//! the body, so only an `extern` declaration is produced here.

use super::Solidifier;
use crate::error::SolidifyError;
use crate::ident;
use beryl_core::proto::{Proto, VarargFlags};
use beryl_core::value::{Closure, Value};

impl Solidifier<'_> {
    pub(crate) fn emit_closure(
        &mut self,
        closure: &Closure,
        prefix: &str,
    ) -> Result<(), SolidifyError> {
        let proto = &closure.proto;
        let id = ident::encode(proto.name.as_bytes());
        let parent = proto.parent();

        if let Some(p) = &parent {
            let pid = ident::encode(p.name.as_bytes());
            if format!("class_{}", pid) != prefix {
                writeln!(
                    self.sink,
                    "// Borrowed method '{}' from class '{}'",
                    proto.name, p.name
                )?;
                writeln!(self.sink, "extern bclosure *class_{}_{};", pid, id)?;
                writeln!(self.sink)?;
                return Ok(());
            }
        }

        // Live captures cannot be reconstructed as constants. Flag the
        // output so it cannot compile unnoticed, but keep emitting.
        if closure.nupvals > 0 {
            writeln!(self.sink, "--> Unsupported upvals in closure <---")?;
        }

        self.emit_inner_classes(proto)?;

        self.emit_banner("function", &proto.name)?;
        if let Some(p) = &parent {
            writeln!(
                self.sink,
                "extern const bclass be_class_{};",
                ident::encode(p.name.as_bytes())
            )?;
        }
        let symbol = match &parent {
            Some(p) => format!("class_{}_{}", ident::encode(p.name.as_bytes()), id),
            None if !prefix.is_empty() => format!("{}_{}", prefix, id),
            None => id,
        };
        writeln!(self.sink, "be_local_closure({},   /* name */", symbol)?;
        self.emit_proto(proto, &symbol, prefix, 1)?;
        writeln!(self.sink)?;
        writeln!(self.sink, ");")?;
        self.emit_footer()?;
        Ok(())
    }

    /// Classes referenced from a constant table must be defined before
    /// the closure that references them, so they are emitted first.
    /// `emit_class` deduplicates by identity, so a helper class shared
    /// between several prototypes is still defined only once.
    ///
    /// Exception: a static method carries its own class as constant 0
    /// (the implicit `_class` reference); re-emitting it here would
    /// recurse into the class currently being emitted around us.
    fn emit_inner_classes(&mut self, proto: &Proto) -> Result<(), SolidifyError> {
        for sub in &proto.protos {
            self.emit_inner_classes(sub)?;
        }
        for (k, constant) in proto.consts.iter().enumerate() {
            if let Value::Class(cl) = constant {
                if k == 0 && proto.varg.contains(VarargFlags::STATIC_METHOD) {
                    continue;
                }
                self.emit_class(cl)?;
            }
        }
        Ok(())
    }
}
