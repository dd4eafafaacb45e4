//! The stack protocol: generic push/pop primitives bridging native types
//! and VM stack values.
//!
//! [`ToStack`] is the push half, [`FromStack`] the pop half. Each
//! `FromStack` pop consumes exactly one stack value, converting it or
//! reporting a [`RuntimeError::ConversionMismatch`] that carries the
//! VM-native names of the actual and expected types.

use std::{cell::RefCell, rc::Rc};

use crate::runtime::{
    error::RuntimeError,
    foreign::Foreign,
    state::State,
    table::{Table, TableKey},
    value::Value,
};

use super::Handle;

/// Native types that can be pushed onto the operand stack.
pub trait ToStack {
    fn push_onto(self, state: &mut State);
}

impl ToStack for Value {
    fn push_onto(self, state: &mut State) {
        state.push(self);
    }
}

impl ToStack for i64 {
    fn push_onto(self, state: &mut State) {
        state.push(Value::Integer(self));
    }
}

impl ToStack for f64 {
    fn push_onto(self, state: &mut State) {
        state.push(Value::Float(self));
    }
}

impl ToStack for bool {
    fn push_onto(self, state: &mut State) {
        state.push(Value::Boolean(self));
    }
}

impl ToStack for &str {
    fn push_onto(self, state: &mut State) {
        state.push(Value::String(Rc::from(self)));
    }
}

impl ToStack for String {
    fn push_onto(self, state: &mut State) {
        state.push(Value::String(Rc::from(self)));
    }
}

impl ToStack for Rc<Table> {
    fn push_onto(self, state: &mut State) {
        state.push(Value::Table(self));
    }
}

impl ToStack for Rc<Foreign> {
    fn push_onto(self, state: &mut State) {
        state.push(Value::Foreign(self));
    }
}

impl ToStack for &Handle {
    fn push_onto(self, state: &mut State) {
        Handle::push_onto(self, state);
    }
}

/// Native types a stack value can be converted to.
///
/// `pop_from` is the generic pop primitive: it removes the top of the
/// stack no matter what, then either converts it or reports the mismatch.
/// Most types only customize `from_value`; `Handle` overrides `pop_from`
/// to re-register the popped value instead.
pub trait FromStack: Sized {
    /// VM-native name of what this conversion expects, for mismatch
    /// errors.
    fn expected() -> &'static str;

    /// Pure conversion from an already-fetched value.
    fn from_value(value: &Value) -> Option<Self>;

    /// Pops the top of the stack and converts it. Exactly one pop, on
    /// success and on failure alike.
    fn pop_from(state: &Rc<RefCell<State>>) -> Result<Self, RuntimeError> {
        let value = state.borrow_mut().pop();
        Self::from_value(&value).ok_or_else(|| RuntimeError::ConversionMismatch {
            actual: value.type_tag().name(),
            expected: Self::expected(),
        })
    }
}

impl FromStack for i64 {
    fn expected() -> &'static str {
        "integer"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromStack for f64 {
    fn expected() -> &'static str {
        "number"
    }

    /// Integers widen to float; the reverse never happens implicitly.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromStack for bool {
    fn expected() -> &'static str {
        "boolean"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromStack for String {
    fn expected() -> &'static str {
        "string"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl FromStack for Value {
    fn expected() -> &'static str {
        "value"
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromStack> FromStack for Vec<T> {
    fn expected() -> &'static str {
        "array table"
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Table(table) = value else {
            return None;
        };
        let len = table.array_len();
        let mut out = Vec::with_capacity(len);
        for i in 1..=len {
            let element = table.get(&TableKey::Integer(i as i64))?;
            out.push(T::from_value(element)?);
        }
        Some(out)
    }
}

impl FromStack for Handle {
    fn expected() -> &'static str {
        "value"
    }

    /// Without a live VM only nil converts, to the nil handle.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Nil => Some(Handle::nil()),
            _ => None,
        }
    }

    /// Handle-to-handle round trip: the popped value is re-registered
    /// under a fresh, independently owned slot.
    fn pop_from(state: &Rc<RefCell<State>>) -> Result<Self, RuntimeError> {
        let slot = state.borrow_mut().register_top();
        Ok(Handle {
            state: Rc::downgrade(state),
            slot,
        })
    }
}
