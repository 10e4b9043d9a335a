//! Module Emission
//!
//! A module emits its string-keyed closure and class members first (each
//! is a self-contained definition), then the `be_local_module` table that
//! references them, then the export line the build system keys on.

use super::Solidifier;
use crate::error::SolidifyError;
use crate::ident;
use beryl_core::map::MapKey;
use beryl_core::value::Value;
use beryl_core::Module;

impl Solidifier<'_> {
    pub(crate) fn emit_module(&mut self, module: &Module) -> Result<(), SolidifyError> {
        let id = ident::encode(module.name.as_bytes());

        module.table.borrow_mut().compact();

        let members: Vec<(MapKey, Value)> = module
            .table
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in &members {
            if !matches!(key, MapKey::Str(_)) {
                continue;
            }
            match value {
                Value::Closure(c) => self.emit_closure(c, "")?,
                Value::Class(cl) => self.emit_class(cl)?,
                _ => {}
            }
        }

        self.emit_banner("module", &module.name)?;
        writeln!(self.sink, "be_local_module({},", id)?;
        writeln!(self.sink, "    \"{}\",", module.name)?;
        let table = module.table.borrow();
        if table.count() == 0 {
            writeln!(self.sink, "    NULL")?;
        } else {
            write!(self.sink, "    ")?;
            self.emit_map(&table, "")?;
            writeln!(self.sink)?;
        }
        writeln!(self.sink, ");")?;
        writeln!(
            self.sink,
            "BE_EXPORT_VARIABLE be_define_const_native_module({});",
            id
        )?;
        self.emit_footer()?;
        Ok(())
    }
}
