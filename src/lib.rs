pub mod address;
pub mod analysis;
pub mod dispatch;
pub mod errors;
pub mod frame;
pub mod gas;
pub mod host;
pub mod i256;
pub mod memory;
pub mod opcode;
pub mod opcode_handlers;
pub mod result;
pub mod revision;
pub mod stack;
pub mod u256;
pub mod vm;

pub use frame::{CallKind, ExecutionState, Message};
pub use result::{ExecutionResult, StatusCode};
pub use revision::Revision;
pub use vm::execute;

#[cfg(test)]
mod fixture_tests;
