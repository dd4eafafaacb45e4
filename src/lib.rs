pub mod handle;
pub mod runtime;
