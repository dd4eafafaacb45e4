//! Reference handles into the VM registry.
//!
//! A [`Handle`] owns exactly one registry slot for its lifetime. Every
//! operation follows the same protocol: push the slot's value onto the
//! operand stack, operate on it through the stack primitives, then restore
//! stack balance before returning.

use std::{
    borrow::Cow,
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::runtime::{
    error::RuntimeError,
    registry::SlotId,
    state::{StackGuard, State},
    value::{TypeTag, Value},
    vm::Vm,
};

pub mod convert;

pub use convert::{FromStack, ToStack};

#[cfg(test)]
mod convert_test;

/// Owning reference to one registry slot of an embedded VM.
///
/// The handle keeps the slot's value alive for as long as it exists and
/// frees the slot when dropped. It holds only a weak reference to the VM:
/// once the VM is gone, every operation degrades to its nil-handle fast
/// path instead of touching freed state.
///
/// Handles are deliberately not `Clone`: duplication re-registers the
/// value under a fresh slot and therefore has a cost, so it is spelled out
/// at the call site as [`Handle::duplicate`].
pub struct Handle {
    state: Weak<RefCell<State>>,
    slot: SlotId,
}

impl Handle {
    /// The nil handle: no VM, no slot. Usable as a "clear this" token in
    /// higher-level APIs.
    pub fn nil() -> Handle {
        Handle {
            state: Weak::new(),
            slot: SlotId::NIL,
        }
    }

    /// Captures the value at `index` into the registry: the value is
    /// duplicated to the top of the stack and moved into a fresh slot, so
    /// net stack depth is unchanged.
    ///
    /// Capturing a nil stack value yields the nil handle; nil never
    /// occupies a slot.
    pub fn from_stack(vm: &Vm, index: usize) -> Handle {
        let rc = vm.state();
        let mut state = rc.borrow_mut();
        state.push_dup(index);
        let slot = state.register_top();
        Handle {
            state: Rc::downgrade(rc),
            slot,
        }
    }

    /// Specialized construction: like [`Handle::from_stack`], but fails
    /// with [`RuntimeError::ConstructionMismatch`] when the value at
    /// `index` has the wrong type tag. The stack is untouched on error.
    pub fn from_stack_typed(
        vm: &Vm,
        index: usize,
        expected: TypeTag,
    ) -> Result<Handle, RuntimeError> {
        let actual = vm.state().borrow().value_at(index).type_tag();
        if actual != expected {
            return Err(RuntimeError::ConstructionMismatch {
                actual: actual.name(),
                expected: expected.name(),
            });
        }
        Ok(Self::from_stack(vm, index))
    }

    /// Pure sentinel check; no VM round-trip.
    pub fn is_nil(&self) -> bool {
        self.slot.is_nil()
    }

    /// Live state, or `None` for the nil handle and for handles whose VM
    /// is already gone (which behave as nil from then on).
    fn live_state(&self) -> Option<Rc<RefCell<State>>> {
        if self.slot.is_nil() {
            return None;
        }
        self.state.upgrade()
    }

    /// Pushes this handle's value onto the operand stack; the inverse of
    /// construction and the entry point of every other operation.
    pub(crate) fn push_onto(&self, state: &mut State) {
        state.push_slot(self.slot);
    }

    /// VM-native type tag of the held value.
    pub fn type_tag(&self) -> TypeTag {
        let Some(rc) = self.live_state() else {
            return TypeTag::Nil;
        };
        let mut state = rc.borrow_mut();
        state.push_slot(self.slot);
        let tag = state.top_tag();
        state.pop_n(1);
        tag
    }

    /// Type name of the held value. Foreign objects report the `__name`
    /// their metatable declared, falling back to the generic name.
    pub fn type_name(&self) -> Cow<'static, str> {
        let Some(rc) = self.live_state() else {
            return Cow::Borrowed(TypeTag::Nil.name());
        };
        let mut state = rc.borrow_mut();
        state.push_slot(self.slot);
        let name = state.top_type_name();
        state.pop_n(1);
        name
    }

    /// Explicit copy: re-registers the value under a fresh slot. The new
    /// handle owns its slot independently; releasing one never affects the
    /// other. Duplicating a nil or detached handle yields the nil handle
    /// with no VM contact.
    pub fn duplicate(&self) -> Handle {
        let Some(rc) = self.live_state() else {
            return Handle::nil();
        };
        let mut state = rc.borrow_mut();
        state.push_slot(self.slot);
        let slot = state.register_top();
        Handle {
            state: self.state.clone(),
            slot,
        }
    }

    /// Converts the held value to a native type via the stack protocol:
    /// one push, paired with exactly one pop performed by the delegated
    /// [`FromStack`] primitive, on success and on failure alike.
    pub fn to<T: FromStack>(&self) -> Result<T, RuntimeError> {
        let Some(rc) = self.live_state() else {
            return T::from_value(&Value::Nil).ok_or(RuntimeError::ConversionMismatch {
                actual: TypeTag::Nil.name(),
                expected: T::expected(),
            });
        };
        rc.borrow_mut().push_slot(self.slot);
        T::pop_from(&rc)
    }

    /// Drops ownership without contacting the VM: the handle becomes nil
    /// and its slot is left to whoever released it externally. Idempotent,
    /// and safe after the VM has already freed the slot.
    pub fn release(&mut self) {
        self.slot = SlotId::NIL;
    }

    /// Frees the slot (unless the VM is gone or tearing down) and nils the
    /// handle. Always nils first, so the slot can never be freed twice.
    fn destroy(&mut self) {
        let slot = std::mem::replace(&mut self.slot, SlotId::NIL);
        if slot.is_nil() {
            return;
        }
        let Some(rc) = self.state.upgrade() else {
            return;
        };
        // try_borrow_mut: a drop that fires while the state is already
        // borrowed (teardown re-entry) must stay inert.
        if let Ok(mut state) = rc.try_borrow_mut()
            && !state.is_closing()
        {
            state.release_slot(slot);
        }
    }

    /// Renders the held value to VM-native text and lends the bytes to
    /// `f` without copying them out. The borrow is valid only inside the
    /// closure; stack balance is restored before returning.
    pub fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let Some(rc) = self.live_state() else {
            return f("Nil");
        };
        let mut state = rc.borrow_mut();
        state.push_slot(self.slot);
        let index = state.len() - 1;
        state.push_rendered(index);
        let result = f(state.top_str());
        // The rendering step pushed one auxiliary value on top of ours.
        state.pop_n(2);
        result
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Two handles are equal only when they reference the *same* VM instance
/// and the VM's native equality (including `__eq` metamethods) holds for
/// their values. Nil handles and handles from different VMs are never
/// equal.
impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        let (Some(a), Some(b)) = (self.live_state(), other.live_state()) else {
            return false;
        };
        if !Rc::ptr_eq(&a, &b) {
            return false;
        }
        let mut state = a.borrow_mut();
        state.push_slot(self.slot);
        state.push_slot(other.slot);
        let mut guard = StackGuard::new(&mut state, 2);
        let depth = guard.state().len();
        guard.state().equals(depth - 2, depth - 1)
    }
}

impl fmt::Display for Handle {
    /// VM-native textual rendering, copied out to outlive the stack. The
    /// nil handle renders as `Nil` without VM contact.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_text(|text| f.write_str(text))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slot.is_nil() {
            write!(f, "Handle(nil)")
        } else {
            write!(f, "Handle(slot {})", self.slot.index())
        }
    }
}

/// Releases an ordered collection of handles: each slot is freed and each
/// handle ends up nil, in order. Used for bulk teardown ahead of relying
/// on drop order.
pub fn release_all(handles: &mut [Handle]) {
    for handle in handles {
        handle.destroy();
    }
}
