//! Prototype Emission
//!
//! A prototype emits as one `be_nested_proto(...)` form: header fields,
//! the upvalue descriptor block, the sub-prototype table, the constant
//! table, name and source, and the bytecode with one line of disassembly
//! per word.
//!
//! The sub-prototype table always carries one slot more than the
//! sub-prototype count: the trailing slot holds the parent-class
//! back-pointer (or NULL). When there are no sub-prototypes at all, the
//! parent class (if any) takes the table's place directly.

use super::Solidifier;
use crate::error::SolidifyError;
use crate::ident;
use beryl_core::code::{disassemble, Instruction};
use beryl_core::proto::Proto;
use beryl_core::{builtins, Opcode};

impl Solidifier<'_> {
    /// Emit a prototype at the given indentation depth.
    ///
    /// `fname` is the symbol context: sub-prototypes recurse with
    /// `<fname>_<index>`, which also names anonymous nested functions.
    /// Ends without a trailing newline; the caller closes the line.
    pub(crate) fn emit_proto(
        &mut self,
        proto: &Proto,
        fname: &str,
        prefix: &str,
        depth: usize,
    ) -> Result<(), SolidifyError> {
        let ind = "  ".repeat(depth);
        writeln!(self.sink, "{}be_nested_proto(", ind)?;
        self.proto_field(&ind, &proto.nstack.to_string(), "nstack")?;
        self.proto_field(&ind, &proto.argc.to_string(), "argc")?;
        self.proto_field(&ind, &proto.varg.bits().to_string(), "varg")?;

        // Upvalue descriptors
        let has_upvals = !proto.upvals.is_empty();
        self.proto_field(&ind, if has_upvals { "1" } else { "0" }, "has upvals")?;
        if has_upvals {
            writeln!(
                self.sink,
                "{}  ( &(const bupvaldesc[{:2}]) {{  /* upvals */",
                ind,
                proto.upvals.len()
            )?;
            for up in &proto.upvals {
                writeln!(
                    self.sink,
                    "{}    be_local_const_upval({}, {}),",
                    ind, up.instack as u8, up.idx
                )?;
            }
            writeln!(self.sink, "{}  }}),", ind)?;
        } else {
            self.proto_field(&ind, "NULL", "no upvals")?;
        }

        // Sub-prototype table; trailing slot is the parent class
        let parent = proto.parent();
        let has_subs = !proto.protos.is_empty();
        self.proto_field(&ind, if has_subs { "1" } else { "0" }, "has sup protos")?;
        if has_subs {
            writeln!(
                self.sink,
                "{}  ( &(const struct bproto*[{:2}]) {{  /* sub protos */",
                ind,
                proto.protos.len() + 1
            )?;
            for (i, sub) in proto.protos.iter().enumerate() {
                let sub_name = format!("{}_{}", fname, i);
                self.emit_proto(sub, &sub_name, prefix, depth + 2)?;
                writeln!(self.sink, ",")?;
            }
            match &parent {
                Some(p) => writeln!(
                    self.sink,
                    "{}    &be_class_{},  /* parent class */",
                    ind,
                    ident::encode(p.name.as_bytes())
                )?,
                None => writeln!(self.sink, "{}    NULL,  /* no parent class */", ind)?,
            }
            writeln!(self.sink, "{}  }}),", ind)?;
        } else {
            match &parent {
                Some(p) => {
                    let class_ref = format!("&be_class_{}", ident::encode(p.name.as_bytes()));
                    self.proto_field(&ind, &class_ref, "parent class")?;
                }
                None => self.proto_field(&ind, "NULL", "no sub protos")?,
            }
        }

        // Constant table
        let has_consts = !proto.consts.is_empty();
        self.proto_field(&ind, if has_consts { "1" } else { "0" }, "has constants")?;
        if has_consts {
            writeln!(
                self.sink,
                "{}  ( &(const bvalue[{:2}]) {{  /* constants */",
                ind,
                proto.consts.len()
            )?;
            for (k, constant) in proto.consts.iter().enumerate() {
                write!(self.sink, "{}  /* K{} */ ", ind, k)?;
                self.emit_value(constant, prefix, "")?;
                writeln!(self.sink, ",")?;
            }
            writeln!(self.sink, "{}  }}),", ind)?;
        } else {
            self.proto_field(&ind, "NULL", "no const")?;
        }

        // Function name; anonymous nested functions take the derived name
        write!(self.sink, "{}  ", ind)?;
        if proto.name.is_empty() {
            if self.literal {
                write!(self.sink, "be_str_weak({})", fname)?;
            } else {
                write!(self.sink, "&be_const_str_{}", fname)?;
            }
        } else {
            self.emit_str_ref(&proto.name)?;
        }
        writeln!(self.sink, ",")?;
        writeln!(self.sink, "{}  &be_const_str_solidified,", ind)?;

        // Bytecode
        writeln!(
            self.sink,
            "{}  ( &(const binstruction[{:2}]) {{  /* code */",
            ind,
            proto.code.len()
        )?;
        for (pc, &word) in proto.code.iter().enumerate() {
            check_global_access(word)?;
            writeln!(
                self.sink,
                "{}    0x{:08X},  //  {:04X}  {}",
                ind,
                word,
                pc,
                disassemble(word)
            )?;
        }
        writeln!(self.sink, "{}  }})", ind)?;
        write!(self.sink, "{})", ind)?;
        Ok(())
    }

    /// One header field line with an aligned trailing comment
    fn proto_field(&mut self, ind: &str, val: &str, comment: &str) -> Result<(), SolidifyError> {
        writeln!(
            self.sink,
            "{}  {:<26}/* {} */",
            ind,
            format!("{},", val),
            comment
        )?;
        Ok(())
    }
}

/// A global access must stay inside the builtin table; a reference past
/// it would dangle in the reconstructed constant.
fn check_global_access(word: u32) -> Result<(), SolidifyError> {
    let Some(ins) = Instruction::decode(word) else {
        return Ok(());
    };
    if matches!(ins.op, Opcode::Getgbl | Opcode::Setgbl) && ins.bx() as usize > builtins::count() {
        return Err(SolidifyError::Internal(format!(
            "non-builtin global G{} ({} builtins)",
            ins.bx(),
            builtins::count()
        )));
    }
    Ok(())
}
