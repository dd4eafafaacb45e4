use crate::runtime::{
    telemetry::{RegistryCounters, RegistryStats},
    value::Value,
};

/// Slot index into the registry.
///
/// A `SlotId` is a lightweight, copyable key for a registered value.
/// [`SlotId::NIL`] is the reserved sentinel meaning "no value registered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u32);

impl SlotId {
    /// Sentinel slot: no value registered.
    pub const NIL: SlotId = SlotId(u32::MAX);

    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }

    /// Returns the raw slot index backing this id.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The VM's value registry: durable storage keyed by slot, independent of
/// the operand stack.
///
/// Released slots go on a free list and are reused by later inserts, so a
/// stale `SlotId` must never be dereferenced; the handle layer guarantees
/// that structurally.
#[derive(Default)]
pub struct Registry {
    slots: Vec<Option<Value>>,
    free_list: Vec<u32>,
    counters: RegistryCounters,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value and returns its slot. Nil is never stored: it maps
    /// to the sentinel, so registering nil costs nothing and "fetch of
    /// sentinel" naturally yields nil again.
    pub fn insert(&mut self, value: Value) -> SlotId {
        if matches!(value, Value::Nil) {
            return SlotId::NIL;
        }
        self.counters.record_register();
        match self.free_list.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(value);
                SlotId(index)
            }
            None => {
                self.slots.push(Some(value));
                SlotId(self.slots.len() as u32 - 1)
            }
        }
    }

    pub fn fetch(&self, slot: SlotId) -> Option<&Value> {
        if slot.is_nil() {
            return None;
        }
        self.slots.get(slot.0 as usize).and_then(|entry| entry.as_ref())
    }

    /// Frees a slot. Releasing the sentinel or an already-freed slot is a
    /// no-op.
    pub fn release(&mut self, slot: SlotId) {
        if slot.is_nil() {
            return;
        }
        if let Some(entry) = self.slots.get_mut(slot.0 as usize)
            && entry.take().is_some()
        {
            self.free_list.push(slot.0);
            self.counters.record_release();
        }
    }

    /// Number of currently occupied slots.
    pub fn live(&self) -> usize {
        self.counters.live() as usize
    }

    pub fn stats(&self) -> RegistryStats {
        self.counters.snapshot()
    }
}
