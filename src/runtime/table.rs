use std::{collections::HashMap, fmt, rc::Rc};

use crate::runtime::value::Value;

/// Key usable in a table: the hashable subset of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Integer(v) => write!(f, "{}", v),
            TableKey::Boolean(v) => write!(f, "{}", v),
            TableKey::String(v) => write!(f, "{}", v),
        }
    }
}

/// Immutable table: a keyed map plus an optional metatable.
///
/// Array-shaped tables use consecutive integer keys starting at 1.
#[derive(Debug)]
pub struct Table {
    entries: HashMap<TableKey, Value>,
    metatable: Option<Rc<Table>>,
}

impl Table {
    pub fn new(entries: HashMap<TableKey, Value>) -> Self {
        Self {
            entries,
            metatable: None,
        }
    }

    pub fn with_metatable(entries: HashMap<TableKey, Value>, metatable: Rc<Table>) -> Self {
        Self {
            entries,
            metatable: Some(metatable),
        }
    }

    /// Builds an array-shaped table with keys `1..=values.len()`.
    pub fn from_array(values: Vec<Value>) -> Self {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (TableKey::Integer(i as i64 + 1), v))
            .collect();
        Self::new(entries)
    }

    pub fn get(&self, key: &TableKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Lookup by string key, the form metamethod resolution uses.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries.get(&TableKey::String(key.to_string()))
    }

    pub fn metatable(&self) -> Option<&Rc<Table>> {
        self.metatable.as_ref()
    }

    pub fn entries(&self) -> &HashMap<TableKey, Value> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the array part: the longest run of consecutive integer
    /// keys starting at 1.
    pub fn array_len(&self) -> usize {
        let mut n = 0usize;
        while self.entries.contains_key(&TableKey::Integer(n as i64 + 1)) {
            n += 1;
        }
        n
    }
}
