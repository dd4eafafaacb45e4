use std::{any::Any, fmt, rc::Rc};

use crate::runtime::{table::Table, value::Value};

/// Metatable field a foreign object may set to override its reported
/// type name.
pub const TYPE_NAME_FIELD: &str = "__name";

/// Opaque host object held by the VM ("userdata").
///
/// The payload is invisible to the VM; only the metatable participates in
/// VM semantics (`__name` for type naming, `__eq` for equality). The
/// declared type name is resolved once here, at the boundary where the
/// object is classified, rather than re-derived on every query.
pub struct Foreign {
    payload: Rc<dyn Any>,
    metatable: Option<Rc<Table>>,
    declared_name: Option<Rc<str>>,
}

impl Foreign {
    pub fn new(payload: Rc<dyn Any>) -> Self {
        Self {
            payload,
            metatable: None,
            declared_name: None,
        }
    }

    pub fn with_metatable(payload: Rc<dyn Any>, metatable: Rc<Table>) -> Self {
        let declared_name = match metatable.get_str(TYPE_NAME_FIELD) {
            Some(Value::String(name)) => Some(name.clone()),
            _ => None,
        };
        Self {
            payload,
            metatable: Some(metatable),
            declared_name,
        }
    }

    /// The `__name` override, if the metatable declared one.
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn metatable(&self) -> Option<&Rc<Table>> {
        self.metatable.as_ref()
    }

    pub fn payload(&self) -> &Rc<dyn Any> {
        &self.payload
    }

    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl fmt::Debug for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared_name() {
            Some(name) => write!(f, "Foreign({})", name),
            None => write!(f, "Foreign(<anonymous>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::runtime::table::TableKey;

    fn named_metatable(name: &str) -> Rc<Table> {
        let mut entries = HashMap::new();
        entries.insert(
            TableKey::String(TYPE_NAME_FIELD.to_string()),
            Value::String(Rc::from(name)),
        );
        Rc::new(Table::new(entries))
    }

    #[test]
    fn test_declared_name_resolved_at_construction() {
        let obj = Foreign::with_metatable(Rc::new(7u32), named_metatable("Point"));
        assert_eq!(obj.declared_name(), Some("Point"));
    }

    #[test]
    fn test_no_metatable_means_no_declared_name() {
        let obj = Foreign::new(Rc::new(7u32));
        assert_eq!(obj.declared_name(), None);
    }

    #[test]
    fn test_non_string_name_field_is_ignored() {
        let mut entries = HashMap::new();
        entries.insert(
            TableKey::String(TYPE_NAME_FIELD.to_string()),
            Value::Integer(5),
        );
        let obj = Foreign::with_metatable(Rc::new(7u32), Rc::new(Table::new(entries)));
        assert_eq!(obj.declared_name(), None);
    }

    #[test]
    fn test_downcast() {
        let obj = Foreign::new(Rc::new(7u32));
        assert_eq!(obj.downcast::<u32>(), Some(&7));
        assert_eq!(obj.downcast::<i64>(), None);
    }
}
