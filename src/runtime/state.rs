use std::{borrow::Cow, rc::Rc};

use crate::runtime::{
    native_function::NativeFunction,
    registry::{Registry, SlotId},
    telemetry::RegistryStats,
    value::{TypeTag, Value},
};

/// Metamethod consulted when raw equality fails for two tables or two
/// foreign objects.
pub const METAMETHOD_EQ: &str = "__eq";

/// The mutable core of one VM instance: operand stack, registry, and the
/// teardown flag.
///
/// Every operation that pushes N values must pop exactly N before
/// returning; the stack is shared by all callers with no isolation between
/// them. Over- and underflow are discipline bugs in this layer, not
/// runtime errors: the stack grows on demand and popping past the bottom
/// panics.
pub struct State {
    stack: Vec<Value>,
    registry: Registry,
    closing: bool,
}

impl State {
    pub(crate) fn new() -> Self {
        Self {
            stack: Vec::new(),
            registry: Registry::new(),
            closing: false,
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Duplicates the value at `index` onto the top of the stack.
    pub fn push_dup(&mut self, index: usize) {
        let value = self.stack[index].clone();
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Value {
        self.stack.pop().expect("operand stack underflow")
    }

    pub fn pop_n(&mut self, n: usize) {
        for _ in 0..n {
            self.pop();
        }
    }

    pub fn value_at(&self, index: usize) -> &Value {
        &self.stack[index]
    }

    pub fn top(&self) -> &Value {
        self.stack.last().expect("operand stack is empty")
    }

    pub fn top_tag(&self) -> TypeTag {
        self.top().type_tag()
    }

    /// Type name of the top value, honoring the declared-name override of
    /// foreign objects.
    pub fn top_type_name(&self) -> Cow<'static, str> {
        match self.top() {
            Value::Foreign(obj) => match obj.declared_name() {
                Some(name) => Cow::Owned(name.to_string()),
                None => Cow::Borrowed(TypeTag::Userdata.name()),
            },
            value => Cow::Borrowed(value.type_tag().name()),
        }
    }

    /// Borrow of the top value's bytes; the top must be a string. Valid
    /// only until the next stack mutation.
    pub fn top_str(&self) -> &str {
        match self.top() {
            Value::String(s) => s,
            other => panic!("expected string on top of stack, found {}", other.type_name()),
        }
    }

    /// Moves the top of the stack into the registry, returning its slot.
    pub fn register_top(&mut self) -> SlotId {
        let value = self.pop();
        self.registry.insert(value)
    }

    /// Pushes the value stored at `slot`; the sentinel pushes nil.
    pub fn push_slot(&mut self, slot: SlotId) {
        let value = self.registry.fetch(slot).cloned().unwrap_or(Value::Nil);
        self.push(value);
    }

    pub fn release_slot(&mut self, slot: SlotId) {
        self.registry.release(slot);
    }

    pub fn registry_stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Native equality of the values at stack indices `a` and `b`: raw
    /// equality first, then the `__eq` metamethod when both operands are
    /// tables or both are foreign objects.
    pub fn equals(&self, a: usize, b: usize) -> bool {
        let (va, vb) = (&self.stack[a], &self.stack[b]);
        if va.raw_equals(vb) {
            return true;
        }
        if let Some(eq) = eq_metamethod(va, vb) {
            return eq
                .call(&[va.clone(), vb.clone()])
                .map(|result| result.is_truthy())
                .unwrap_or(false);
        }
        false
    }

    /// Pushes the textual rendering of the value at `index` as a string
    /// value. Always pushes exactly one value.
    pub fn push_rendered(&mut self, index: usize) {
        let text = self.stack[index].render();
        self.push(Value::String(Rc::from(text)));
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub(crate) fn set_closing(&mut self, closing: bool) {
        self.closing = closing;
    }
}

fn eq_metamethod(a: &Value, b: &Value) -> Option<NativeFunction> {
    let (mt_a, mt_b) = match (a, b) {
        (Value::Table(x), Value::Table(y)) => (x.metatable(), y.metatable()),
        (Value::Foreign(x), Value::Foreign(y)) => (x.metatable(), y.metatable()),
        _ => return None,
    };
    for metatable in [mt_a, mt_b].into_iter().flatten() {
        if let Some(Value::Function(eq)) = metatable.get_str(METAMETHOD_EQ) {
            return Some(*eq);
        }
    }
    None
}

/// Pops a fixed number of values when the scope exits, on every exit path.
pub struct StackGuard<'a> {
    state: &'a mut State,
    count: usize,
}

impl<'a> StackGuard<'a> {
    pub fn new(state: &'a mut State, count: usize) -> Self {
        Self { state, count }
    }

    pub fn state(&mut self) -> &mut State {
        self.state
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.state.pop_n(self.count);
    }
}
