use std::{cell::RefCell, rc::Rc};

use crate::{
    handle::convert::ToStack,
    runtime::{state::State, telemetry::RegistryStats, value::Value},
};

/// Owner of one embedded VM instance.
///
/// The `Vm` holds the only strong reference to its [`State`]; handles hold
/// weak ones. Dropping the `Vm` (or calling [`Vm::close`]) sets the
/// teardown flag first, so handles destroyed afterwards never touch a
/// registry that is going away.
pub struct Vm {
    state: Rc<RefCell<State>>,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new())),
        }
    }

    /// Pushes a native value onto the operand stack.
    pub fn push(&self, value: impl ToStack) {
        value.push_onto(&mut self.state.borrow_mut());
    }

    /// Pops the top of the operand stack.
    pub fn pop(&self) -> Value {
        self.state.borrow_mut().pop()
    }

    pub fn stack_len(&self) -> usize {
        self.state.borrow().len()
    }

    /// Copy of the value at the given stack index.
    pub fn value_at(&self, index: usize) -> Value {
        self.state.borrow().value_at(index).clone()
    }

    /// Begins teardown: from here on, dropping a handle no longer contacts
    /// the registry.
    pub fn close(&self) {
        self.state.borrow_mut().set_closing(true);
    }

    pub fn registry_stats(&self) -> RegistryStats {
        self.state.borrow().registry_stats()
    }

    pub(crate) fn state(&self) -> &Rc<RefCell<State>> {
        &self.state
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Vm {
    fn drop(&mut self) {
        self.state.borrow_mut().set_closing(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_balance() {
        let vm = Vm::new();
        vm.push(1i64);
        vm.push("two");
        assert_eq!(vm.stack_len(), 2);
        assert!(matches!(vm.pop(), Value::String(_)));
        assert!(matches!(vm.pop(), Value::Integer(1)));
        assert_eq!(vm.stack_len(), 0);
    }

    #[test]
    fn test_close_sets_teardown_flag() {
        let vm = Vm::new();
        assert!(!vm.state().borrow().is_closing());
        vm.close();
        assert!(vm.state().borrow().is_closing());
    }
}
