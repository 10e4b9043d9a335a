//! Classes and Instances
//!
//! A `Class` is a name, a per-instance variable count, an optional super
//! class, and a member map (string keys to methods or shared constants).
//! The member map lives behind a `RefCell` because a class must exist
//! before its methods do: method prototypes hold a weak back-reference to
//! their class, so construction is class first, members second.
//!
//! The VM's simple data carriers (`map`, `list`, `bytes`) are themselves
//! classes; [`ClassKind`] distinguishes them from user classes so
//! consumers can special-case their instances.

use crate::map::Map;
use crate::string::BerylString;
use crate::value::{NativePayload, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Builtin data classes vs. user classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    User,
    Map,
    List,
    Bytes,
}

#[derive(Debug)]
pub struct Class {
    pub name: BerylString,
    /// Number of per-instance variable slots
    pub nvar: u32,
    pub super_: Option<Rc<Class>>,
    pub kind: ClassKind,
    /// Member table, set after construction (see module docs)
    pub members: RefCell<Option<Map>>,
}

impl Class {
    pub fn new(name: &str, nvar: u32, kind: ClassKind) -> Self {
        Class {
            name: BerylString::from(name),
            nvar,
            super_: None,
            kind,
            members: RefCell::new(None),
        }
    }

    /// The builtin `map` helper class
    pub fn map_class() -> Rc<Class> {
        Rc::new(Class::new("map", 1, ClassKind::Map))
    }

    /// The builtin `list` helper class
    pub fn list_class() -> Rc<Class> {
        Rc::new(Class::new("list", 1, ClassKind::List))
    }

    /// The builtin `bytes` class
    pub fn bytes_class() -> Rc<Class> {
        Rc::new(Class::new("bytes", 2, ClassKind::Bytes))
    }

    pub fn set_members(&self, members: Map) {
        *self.members.borrow_mut() = Some(members);
    }
}

/// An instantiated class: member slots plus optional inheritance linkage.
///
/// `super_` and `sub` form the instance chain of an object with
/// inheritance state; plain data instances have neither.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub super_: Option<Rc<Instance>>,
    pub sub: Option<Weak<Instance>>,
    pub members: Vec<Value>,
}

impl Instance {
    /// A `bytes` instance: raw buffer at slot 0, length at slot 1
    pub fn bytes(buf: Vec<u8>) -> Rc<Instance> {
        let len = buf.len() as i64;
        Rc::new(Instance {
            class: Class::bytes_class(),
            super_: None,
            sub: None,
            members: vec![
                Value::NativePtr(NativePayload::Buffer(Rc::new(buf))),
                Value::Int(len),
            ],
        })
    }

    /// A `map` helper instance wrapping one map at slot 0
    pub fn simple_map(map: Map) -> Rc<Instance> {
        Rc::new(Instance {
            class: Class::map_class(),
            super_: None,
            sub: None,
            members: vec![Value::map(map)],
        })
    }

    /// A `list` helper instance wrapping one list at slot 0
    pub fn simple_list(list: crate::list::List) -> Rc<Instance> {
        Rc::new(Instance {
            class: Class::list_class(),
            super_: None,
            sub: None,
            members: vec![Value::list(list)],
        })
    }
}
