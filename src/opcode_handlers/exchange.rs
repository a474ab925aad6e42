//! Exchange Operations (16)
//! Opcodes: SWAP1 ... SWAP16

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;

pub fn swap(state: &mut ExecutionState<'_>, depth: usize) -> Result<(), ExecutionError> {
    state.stack.swap(depth)
}
