//! Class Emission
//!
//! Order matters: the class is forward-declared before its members are
//! walked, so method bodies can reference the class they belong to, and
//! every member closure is defined before the `be_local_class` form whose
//! member map refers to it.
//!
//! One class may be reached many times in a single dump (shared helper
//! classes appear in several constant tables); only the first visit
//! defines it, later visits are no-ops against the already-emitted
//! symbol.

use super::Solidifier;
use crate::error::SolidifyError;
use crate::ident;
use beryl_core::map::MapKey;
use beryl_core::value::{Closure, Value};
use beryl_core::Class;
use std::rc::Rc;

impl Solidifier<'_> {
    pub(crate) fn emit_class(&mut self, class: &Rc<Class>) -> Result<(), SolidifyError> {
        if !self.emitted_classes.insert(Rc::as_ptr(class)) {
            return Ok(());
        }

        let id = ident::encode(class.name.as_bytes());

        writeln!(self.sink)?;
        writeln!(self.sink, "extern const bclass be_class_{};", id)?;
        writeln!(self.sink)?;

        // Collect first: member emission must not hold the map borrow
        // while a method's own constants pull in further classes.
        let class_prefix = format!("class_{}", id);
        let member_closures: Vec<Rc<Closure>> = {
            let members = class.members.borrow();
            members
                .as_ref()
                .map(|map| {
                    map.iter()
                        .filter_map(|(k, v)| match (k, v) {
                            (MapKey::Str(_), Value::Closure(c)) => Some(c.clone()),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        for closure in &member_closures {
            self.emit_closure(closure, &class_prefix)?;
        }

        self.emit_banner("class", &class.name)?;
        if let Some(sup) = &class.super_ {
            writeln!(
                self.sink,
                "extern const bclass be_class_{};",
                ident::encode(sup.name.as_bytes())
            )?;
        }
        writeln!(self.sink, "be_local_class({},", id)?;
        writeln!(self.sink, "    {},", class.nvar)?;
        match &class.super_ {
            Some(sup) => writeln!(
                self.sink,
                "    &be_class_{},",
                ident::encode(sup.name.as_bytes())
            )?,
            None => writeln!(self.sink, "    NULL,")?,
        }
        {
            let mut members = class.members.borrow_mut();
            if let Some(map) = members.as_mut() {
                map.compact();
            }
        }
        let members = class.members.borrow();
        match members.as_ref() {
            Some(map) => {
                write!(self.sink, "    ")?;
                self.emit_map(map, &class_prefix)?;
                writeln!(self.sink, ",")?;
            }
            None => writeln!(self.sink, "    NULL,")?,
        }
        write!(self.sink, "    ")?;
        self.emit_str_ref(&class.name)?;
        writeln!(self.sink)?;
        writeln!(self.sink, ");")?;
        self.emit_footer()?;
        Ok(())
    }
}
