//! Value: What the language talks about
//!
//! The tagged sum over everything a Beryl program can hold. Scalars are
//! stored inline; aggregates (`Closure`, `Class`, `Instance`, `Map`,
//! `List`, `Module`) are `Rc`-backed so cloning a `Value` never deep-copies
//! the graph. `Map` and `List` carry a `RefCell` because the VM mutates
//! them in place; every other aggregate is frozen at construction.

use crate::class::{Class, Instance};
use crate::list::List;
use crate::map::Map;
use crate::module::Module;
use crate::proto::Proto;
use crate::string::BerylString;
use std::cell::RefCell;
use std::rc::Rc;

/// Beryl real number.
///
/// `f64` by default; the `single-float` build uses `f32` on small targets.
/// The width is observable wherever a real's exact bit pattern matters.
#[cfg(not(feature = "single-float"))]
pub type Real = f64;

#[cfg(feature = "single-float")]
pub type Real = f32;

/// Payload of a native pointer value.
///
/// The VM never follows these pointers through the object model; they are
/// resolved by symbol name where they are consumed. Byte buffers are the
/// exception: `bytes` instances store their storage here so consumers can
/// read the raw content.
#[derive(Debug, Clone)]
pub enum NativePayload {
    /// Opaque pointer, resolved by name at link time of generated code
    Opaque,
    /// Raw byte buffer owned by a `bytes` instance
    Buffer(Rc<Vec<u8>>),
}

/// A function closure: a shared prototype plus capture metadata.
///
/// The environment itself lives on the VM stack at run time; the object
/// model only records how many upvalues the closure expects.
#[derive(Debug, Clone)]
pub struct Closure {
    pub proto: Rc<Proto>,
    /// Number of live captured upvalues
    pub nupvals: u8,
    /// Static method flag (no implicit self argument)
    pub is_static: bool,
}

impl Closure {
    pub fn new(proto: Rc<Proto>) -> Self {
        Closure {
            proto,
            nupvals: 0,
            is_static: false,
        }
    }
}

/// Core value enum
#[derive(Debug, Clone)]
pub enum Value {
    Nil,

    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Variable-slot index. Semantically an integer, but kept distinct so
    /// consumers can tell a slot reference from ordinary integer data.
    Index(i64),

    /// IEEE-754 real (width per build, see [`Real`])
    Real(Real),

    /// Byte string
    Str(BerylString),

    Closure(Rc<Closure>),

    Class(Rc<Class>),

    /// Native function, resolved by name where consumed. Static members
    /// carry the flag with the value itself.
    NativeFunc { is_static: bool },

    /// Native pointer (opaque, or an owned byte buffer)
    NativePtr(NativePayload),

    Instance(Rc<Instance>),

    Map(Rc<RefCell<Map>>),

    List(Rc<RefCell<List>>),

    Module(Rc<Module>),
}

impl Value {
    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Index(_) => "index",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
            Value::Closure(_) => "closure",
            Value::Class(_) => "class",
            Value::NativeFunc { .. } => "ntvfunc",
            Value::NativePtr(_) => "ntvptr",
            Value::Instance(_) => "instance",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Module(_) => "module",
        }
    }

    /// Convenience constructor: string value from a `&str`
    pub fn str(s: &str) -> Value {
        Value::Str(BerylString::from(s))
    }

    /// Convenience constructor: wrap a map
    pub fn map(m: Map) -> Value {
        Value::Map(Rc::new(RefCell::new(m)))
    }

    /// Convenience constructor: wrap a list
    pub fn list(l: List) -> Value {
        Value::List(Rc::new(RefCell::new(l)))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}
