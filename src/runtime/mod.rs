//! The embedded VM boundary: dynamic values, the operand stack, and the
//! slot registry that keeps values alive independent of the stack.
//!
//! # Value lifetime model
//! A value is either *on the stack* (transient, destroyed by the next pop)
//! or *in the registry* (durable, keyed by a [`registry::SlotId`]). All
//! transfer between the two passes through the stack: registering pops the
//! top into a slot, and pushing a slot copies the stored value back onto
//! the top. The handle layer in [`crate::handle`] builds on exactly this
//! boundary and nothing else.
//!
//! Heap-backed `Value` variants use `Rc` for cheap sharing, so runtime
//! values must remain acyclic: tables and foreign objects may reference
//! other values, but never a value that already reaches them.

pub mod error;
pub mod foreign;
pub mod native_function;
pub mod registry;
pub mod state;
pub mod table;
pub mod telemetry;
pub mod value;
pub mod vm;
