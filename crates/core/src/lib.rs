//! Beryl Core: the object model of the Beryl VM
//!
//! This crate provides the in-memory object graph that the rest of the
//! toolchain consumes: tagged values, interned strings, the chained-bucket
//! map, function prototypes with bytecode, classes/instances, and modules.
//!
//! The types here are deliberately read-mostly. A compiler or REPL builds
//! the graph; downstream consumers (notably `beryl-solidify`) only walk it.
//! Aggregate values are `Rc`-backed so cloning a `Value` is cheap and the
//! graph can share prototypes between closures.
//!
//! # Modules
//!
//! - `string`: Interned immutable byte strings (`BerylString`)
//! - `value`: Core `Value` enum (Nil, Int, Real, Str, Closure, Map, etc.)
//! - `map`: Open-addressed hash map with chained buckets
//! - `list`: Dense ordered value sequence
//! - `proto`: Function prototypes (stack layout, upvalues, constants, code)
//! - `class`: Classes and instances
//! - `module`: Named module tables
//! - `code`: Instruction word format, opcodes, disassembly
//! - `builtins`: The VM's global builtin name table

pub mod builtins;
pub mod class;
pub mod code;
pub mod list;
pub mod map;
pub mod module;
pub mod proto;
pub mod string;
pub mod value;

pub use class::{Class, ClassKind, Instance};
pub use code::{Instruction, Opcode};
pub use list::List;
pub use map::{Map, MapKey, NEXT_NIL};
pub use module::Module;
pub use proto::{Proto, UpvalDesc, VarargFlags};
pub use string::BerylString;
pub use value::{Closure, NativePayload, Real, Value};
