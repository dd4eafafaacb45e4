use std::{fmt, rc::Rc};

use crate::runtime::{foreign::Foreign, native_function::NativeFunction, table::Table};

/// Dynamic value as the VM sees it, on the stack or in the registry.
///
/// Primitives are unboxed; heap-backed variants share their allocation
/// through `Rc`, so cloning a value is O(1) and never deep-copies.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of value.
    Nil,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// UTF-8 string value.
    String(Rc<str>),
    /// Table keyed by hashable values, with an optional metatable.
    Table(Rc<Table>),
    /// Host function callable by the VM (metamethods included).
    Function(NativeFunction),
    /// Opaque host object ("userdata").
    Foreign(Rc<Foreign>),
}

/// VM-native type tag.
///
/// One tag per `Value` shape; [`TypeTag::name`] is the stable, user-visible
/// spelling used in diagnostics and by `Handle::type_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Table,
    Function,
    Userdata,
}

impl TypeTag {
    /// Returns the canonical type label. These labels are user-visible and
    /// are expected to remain stable.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Table => "table",
            TypeTag::Function => "function",
            TypeTag::Userdata => "userdata",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::Nil,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
            Value::Table(_) => TypeTag::Table,
            Value::Function(_) => TypeTag::Function,
            Value::Foreign(_) => TypeTag::Userdata,
        }
    }

    /// Generic type name, without the foreign declared-name override.
    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Equality without metamethods: numeric across integer/float, strings
    /// by content, tables and foreign objects by allocation identity,
    /// functions by pointer identity.
    pub fn raw_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Foreign(a), Value::Foreign(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }

    /// VM-native textual rendering. Top-level strings render as their raw
    /// contents; everything else uses the display form.
    pub fn render(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Table(table) => {
                // Sorted by key so the rendering is deterministic.
                let mut entries: Vec<_> = table.entries().iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                let items: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Foreign(obj) => match obj.declared_name() {
                Some(name) => write!(f, "<userdata {}>", name),
                None => write!(f, "<userdata>"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::runtime::table::TableKey;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::String(Rc::from("hi")).to_string(), "\"hi\"");
    }

    #[test]
    fn test_render_strings_unquoted() {
        assert_eq!(Value::String(Rc::from("foobar")).render(), "foobar");
        assert_eq!(Value::Nil.render(), "nil");
    }

    #[test]
    fn test_table_display_is_sorted() {
        let mut entries = HashMap::new();
        entries.insert(TableKey::String("b".to_string()), Value::Integer(2));
        entries.insert(TableKey::String("a".to_string()), Value::Integer(1));
        entries.insert(TableKey::Integer(1), Value::Boolean(true));
        let value = Value::Table(Rc::new(Table::new(entries)));
        assert_eq!(value.to_string(), "{1: true, a: 1, b: 2}");
    }

    #[test]
    fn test_is_truthy() {
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Nil.is_truthy());
    }

    #[test]
    fn test_raw_equals_numeric() {
        assert!(Value::Integer(1).raw_equals(&Value::Float(1.0)));
        assert!(Value::Float(1.0).raw_equals(&Value::Integer(1)));
        assert!(!Value::Integer(1).raw_equals(&Value::Float(1.5)));
        assert!(!Value::Integer(1).raw_equals(&Value::String(Rc::from("1"))));
    }

    #[test]
    fn test_raw_equals_identity_for_tables() {
        let a = Rc::new(Table::new(HashMap::new()));
        let b = Rc::new(Table::new(HashMap::new()));
        assert!(Value::Table(a.clone()).raw_equals(&Value::Table(a.clone())));
        assert!(!Value::Table(a).raw_equals(&Value::Table(b)));
    }

    #[test]
    fn test_type_tag_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Integer(1).type_name(), "integer");
        assert_eq!(Value::String(Rc::from("x")).type_name(), "string");
        assert_eq!(TypeTag::Userdata.name(), "userdata");
    }
}
