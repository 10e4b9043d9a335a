//! Named Module Tables
//!
//! A module is a name plus a map from member names to values. The table
//! is mutable for as long as the VM is loading the module; consumers that
//! freeze modules treat it as read-only.

use crate::map::{Map, MapKey};
use crate::string::BerylString;
use crate::value::Value;
use std::cell::RefCell;

#[derive(Debug)]
pub struct Module {
    pub name: BerylString,
    pub table: RefCell<Map>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Module {
            name: BerylString::from(name),
            table: RefCell::new(Map::new()),
        }
    }

    /// Insert a string-keyed member
    pub fn insert(&self, key: &str, value: Value) {
        self.table.borrow_mut().insert(MapKey::str(key), value);
    }
}
