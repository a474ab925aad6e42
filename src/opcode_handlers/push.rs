//! Push Operations
//! Opcodes: PUSH0, PUSH1 ... PUSH32
//!
//! The immediate value was already decoded by the analyzer (§4.3 rule 3); this
//! handler only moves it from the instruction's argument onto the stack.

use crate::analysis::InstructionArg;
use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::u256::U256;

pub fn push(state: &mut ExecutionState<'_>, arg: InstructionArg) -> Result<(), ExecutionError> {
    let value = match arg {
        InstructionArg::SmallPush(word) => U256::from(word),
        InstructionArg::PushPoolIndex(index) => state
            .analysis
            .push_pool
            .get(index)
            .copied()
            .unwrap_or_else(U256::zero),
        InstructionArg::None | InstructionArg::Block(_) => U256::zero(),
    };
    state.stack.push(value)
}
