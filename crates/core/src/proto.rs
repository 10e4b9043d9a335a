//! Function Prototypes
//!
//! A `Proto` is the immutable code-plus-metadata part of a function,
//! shared by every closure over it: register budget, arity, upvalue
//! descriptors, nested prototypes, the constant table, and bytecode.
//!
//! A prototype compiled as a class method also remembers which class it
//! belongs to. That back-reference closes a cycle (class members hold
//! closures, closures hold prototypes), so it is a `Weak` pointer: the
//! class owns its methods, never the other way around.

use crate::class::Class;
use crate::string::BerylString;
use crate::value::Value;
use bitflags::bitflags;
use std::rc::{Rc, Weak};

bitflags! {
    /// Vararg and method flags of a prototype
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VarargFlags: u8 {
        /// Accepts trailing variable arguments
        const VARARG = 0x01;
        /// Compiled as an instance method (implicit self in slot 0)
        const METHOD = 0x02;
        /// Compiled as a static method (implicit _class in constant 0)
        const STATIC_METHOD = 0x04;
    }
}

/// Describes one captured upvalue
#[derive(Debug, Clone, Copy)]
pub struct UpvalDesc {
    /// Captured from the enclosing function's stack frame (vs. relayed
    /// from the enclosing function's own upvalues)
    pub instack: bool,
    /// Source slot index
    pub idx: u8,
}

/// Immutable function prototype
#[derive(Debug)]
pub struct Proto {
    pub name: BerylString,
    /// Source file the function was compiled from
    pub source: BerylString,
    /// Stack slots the function needs
    pub nstack: u8,
    /// Fixed argument count
    pub argc: u8,
    pub varg: VarargFlags,
    pub upvals: Vec<UpvalDesc>,
    /// Nested function prototypes, in definition order
    pub protos: Vec<Rc<Proto>>,
    /// Owning class when this prototype is a method body
    pub parent_class: Option<Weak<Class>>,
    /// Constant table, indexed by K operands
    pub consts: Vec<Value>,
    /// Bytecode words (see [`crate::code`])
    pub code: Vec<u32>,
}

impl Proto {
    /// New empty prototype with the given name, compiled "nowhere"
    pub fn new(name: &str) -> Self {
        Proto {
            name: BerylString::from(name),
            source: BerylString::from("string"),
            nstack: 1,
            argc: 0,
            varg: VarargFlags::empty(),
            upvals: Vec::new(),
            protos: Vec::new(),
            parent_class: None,
            consts: Vec::new(),
            code: Vec::new(),
        }
    }

    /// Upgrade the parent-class back-reference, if any is still alive
    pub fn parent(&self) -> Option<Rc<Class>> {
        self.parent_class.as_ref()?.upgrade()
    }
}
