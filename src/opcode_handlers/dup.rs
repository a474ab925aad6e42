//! Duplication Operation (16)
//! Opcodes: DUP1 ... DUP16

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;

pub fn dup(state: &mut ExecutionState<'_>, depth: usize) -> Result<(), ExecutionError> {
    state.stack.dup(depth)
}
