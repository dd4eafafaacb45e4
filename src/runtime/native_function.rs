use std::fmt;

use crate::runtime::{error::RuntimeError, value::Value};

/// Signature for host functions callable by the VM.
pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// Named host function value. Used for metamethods such as `__eq`.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    name: &'static str,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &'static str, func: NativeFn) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.func, other.func)
    }
}
