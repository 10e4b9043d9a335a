//! Instruction Word Format, Opcodes, Disassembly
//!
//! Beryl bytecode is a flat array of 32-bit words:
//!
//! ```text
//!  31      26 25      18 17       9 8        0
//! +----------+----------+----------+----------+
//! |  opcode  |    A     |    B     |    C     |
//! +----------+----------+----------+----------+
//!                       |        Bx (18)      |
//! ```
//!
//! B and C address either a register or a constant-table entry; the top
//! bit of the 9-bit field is the constant flag (`K` operands in the
//! disassembly). `Bx` spans B and C; `sBx` is `Bx` biased by
//! [`SBX_BIAS`] for signed jump offsets.

use num_enum::TryFromPrimitive;
use std::fmt;

const OP_SHIFT: u32 = 26;
const A_SHIFT: u32 = 18;
const B_SHIFT: u32 = 9;
const A_MASK: u32 = 0xFF;
const BC_MASK: u32 = 0x1FF;
const BX_MASK: u32 = 0x3FFFF;

/// Constant-table flag on a B or C operand
pub const K_FLAG: u16 = 0x100;

/// Bias subtracted from `Bx` to recover a signed jump offset
pub const SBX_BIAS: i32 = 0x1FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Add = 0,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Neg,
    Not,
    Move,
    Ldnil,
    Ldbool,
    Ldint,
    Ldconst,
    Getgbl,
    Setgbl,
    Getupv,
    Setupv,
    Getmbr,
    Setmbr,
    Getmet,
    Getidx,
    Setidx,
    Jmp,
    Jmpf,
    Jmpt,
    Call,
    Closure,
    Class,
    Close,
    Ret,
    Import,
    Raise,
}

/// Operand shape of an opcode, used by the disassembly formatter
enum OpFormat {
    /// A, B, C with RK-flagged B and C
    Abc,
    /// A, B with RK-flagged B
    Ab,
    /// A only
    A,
    /// A plus raw B and C (LDBOOL)
    AbcRaw,
    /// A plus signed offset
    Asbx,
    /// Signed offset only
    Sbx,
    /// A plus constant index
    Akx,
    /// A plus global index
    Agbl,
    /// A plus upvalue index
    Aupv,
    /// A plus nested-prototype index
    Aproto,
    /// A plus raw B (call/ret argument counts)
    AbRaw,
}

impl Opcode {
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Lt => "LT",
            Opcode::Le => "LE",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Neg => "NEG",
            Opcode::Not => "NOT",
            Opcode::Move => "MOVE",
            Opcode::Ldnil => "LDNIL",
            Opcode::Ldbool => "LDBOOL",
            Opcode::Ldint => "LDINT",
            Opcode::Ldconst => "LDCONST",
            Opcode::Getgbl => "GETGBL",
            Opcode::Setgbl => "SETGBL",
            Opcode::Getupv => "GETUPV",
            Opcode::Setupv => "SETUPV",
            Opcode::Getmbr => "GETMBR",
            Opcode::Setmbr => "SETMBR",
            Opcode::Getmet => "GETMET",
            Opcode::Getidx => "GETIDX",
            Opcode::Setidx => "SETIDX",
            Opcode::Jmp => "JMP",
            Opcode::Jmpf => "JMPF",
            Opcode::Jmpt => "JMPT",
            Opcode::Call => "CALL",
            Opcode::Closure => "CLOSURE",
            Opcode::Class => "CLASS",
            Opcode::Close => "CLOSE",
            Opcode::Ret => "RET",
            Opcode::Import => "IMPORT",
            Opcode::Raise => "RAISE",
        }
    }

    fn format(self) -> OpFormat {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Lt
            | Opcode::Le
            | Opcode::Eq
            | Opcode::Ne
            | Opcode::Gt
            | Opcode::Ge
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::Getmbr
            | Opcode::Setmbr
            | Opcode::Getmet
            | Opcode::Getidx
            | Opcode::Setidx
            | Opcode::Raise => OpFormat::Abc,
            Opcode::Neg | Opcode::Not | Opcode::Move | Opcode::Import => OpFormat::Ab,
            Opcode::Ldnil | Opcode::Close => OpFormat::A,
            Opcode::Ldbool => OpFormat::AbcRaw,
            Opcode::Ldint | Opcode::Jmpf | Opcode::Jmpt => OpFormat::Asbx,
            Opcode::Jmp => OpFormat::Sbx,
            Opcode::Ldconst | Opcode::Class => OpFormat::Akx,
            Opcode::Getgbl | Opcode::Setgbl => OpFormat::Agbl,
            Opcode::Getupv | Opcode::Setupv => OpFormat::Aupv,
            Opcode::Closure => OpFormat::Aproto,
            Opcode::Call | Opcode::Ret => OpFormat::AbRaw,
        }
    }
}

/// Decoded instruction word
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub op: Opcode,
    pub a: u8,
    pub b: u16,
    pub c: u16,
}

impl Instruction {
    /// Decode a raw word. Returns `None` on an unknown opcode.
    pub fn decode(word: u32) -> Option<Instruction> {
        let op = Opcode::try_from((word >> OP_SHIFT) as u8).ok()?;
        Some(Instruction {
            op,
            a: ((word >> A_SHIFT) & A_MASK) as u8,
            b: ((word >> B_SHIFT) & BC_MASK) as u16,
            c: (word & BC_MASK) as u16,
        })
    }

    /// The 18-bit Bx field spanning B and C
    pub fn bx(self) -> u32 {
        ((self.b as u32) << 9) | self.c as u32
    }

    /// Bx as a signed, biased offset
    pub fn sbx(self) -> i32 {
        self.bx() as i32 - SBX_BIAS
    }
}

/// Format a B/C operand: `Kn` for constant references, `Rn` for registers
fn rk(operand: u16) -> String {
    if operand & K_FLAG != 0 {
        format!("K{}", operand & 0xFF)
    } else {
        format!("R{}", operand)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.op.name();
        match self.op.format() {
            OpFormat::Abc => {
                write!(f, "{}\tR{}\t{}\t{}", name, self.a, rk(self.b), rk(self.c))
            }
            OpFormat::Ab => write!(f, "{}\tR{}\t{}", name, self.a, rk(self.b)),
            OpFormat::A => write!(f, "{}\tR{}", name, self.a),
            OpFormat::AbcRaw => write!(f, "{}\tR{}\t{}\t{}", name, self.a, self.b, self.c),
            OpFormat::Asbx => write!(f, "{}\tR{}\t{}", name, self.a, self.sbx()),
            OpFormat::Sbx => write!(f, "{}\t#{:+}", name, self.sbx()),
            OpFormat::Akx => write!(f, "{}\tR{}\tK{}", name, self.a, self.bx()),
            OpFormat::Agbl => write!(f, "{}\tR{}\tG{}", name, self.a, self.bx()),
            OpFormat::Aupv => write!(f, "{}\tR{}\tU{}", name, self.a, self.b),
            OpFormat::Aproto => write!(f, "{}\tR{}\tP{}", name, self.a, self.bx()),
            OpFormat::AbRaw => write!(f, "{}\tR{}\t{}", name, self.a, self.b),
        }
    }
}

/// One line of human-readable disassembly for a raw word.
///
/// Unknown opcodes render as `INVALID` rather than failing; the word is
/// preserved in hex either way by callers that print it.
pub fn disassemble(word: u32) -> String {
    match Instruction::decode(word) {
        Some(ins) => ins.to_string(),
        None => format!("INVALID\t0x{:08X}", word),
    }
}

/// Encode an A/B/C-form word
pub fn encode_abc(op: Opcode, a: u8, b: u16, c: u16) -> u32 {
    ((op as u32) << OP_SHIFT)
        | ((a as u32) << A_SHIFT)
        | (((b as u32) & BC_MASK) << B_SHIFT)
        | ((c as u32) & BC_MASK)
}

/// Encode an A/Bx-form word
pub fn encode_abx(op: Opcode, a: u8, bx: u32) -> u32 {
    ((op as u32) << OP_SHIFT) | ((a as u32) << A_SHIFT) | (bx & BX_MASK)
}

/// Encode an A/sBx-form word
pub fn encode_asbx(op: Opcode, a: u8, sbx: i32) -> u32 {
    encode_abx(op, a, (sbx + SBX_BIAS) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trip_abc() {
        let word = encode_abc(Opcode::Add, 2, 1, K_FLAG | 3);
        let ins = Instruction::decode(word).unwrap();
        assert_eq!(ins.op, Opcode::Add);
        assert_eq!(ins.a, 2);
        assert_eq!(ins.b, 1);
        assert_eq!(ins.c, K_FLAG | 3);
        assert_eq!(ins.to_string(), "ADD\tR2\tR1\tK3");
    }

    #[test]
    fn test_decode_round_trip_bx() {
        let word = encode_abx(Opcode::Getgbl, 1, 7);
        let ins = Instruction::decode(word).unwrap();
        assert_eq!(ins.op, Opcode::Getgbl);
        assert_eq!(ins.bx(), 7);
        assert_eq!(ins.to_string(), "GETGBL\tR1\tG7");
    }

    #[test]
    fn test_sbx_bias() {
        let word = encode_asbx(Opcode::Jmp, 0, -3);
        let ins = Instruction::decode(word).unwrap();
        assert_eq!(ins.sbx(), -3);
    }

    #[test]
    fn test_invalid_opcode() {
        // Highest 6-bit patterns are unassigned
        let word = 0xFFFF_FFFF;
        assert!(Instruction::decode(word).is_none());
        assert!(disassemble(word).starts_with("INVALID"));
    }
}
