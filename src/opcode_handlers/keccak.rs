//! KECCAK256 (1)
//! Opcodes: KECCAK256

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::keccak256_dynamic_cost;
use crate::u256::U256;
use sha3::{Digest, Keccak256};

pub fn keccak256(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    let dynamic_cost = size
        .fits_u64()
        .then(|| keccak256_dynamic_cost(size.as_u64()))
        .flatten()
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost.saturating_add(dynamic_cost))?;

    if size.is_zero() {
        let digest = Keccak256::digest([]);
        return state.stack.push(U256::from_be_bytes(digest.as_ref().try_into().unwrap_or([0; 32])));
    }
    let bytes = state.memory.get(offset.as_usize(), size.as_usize());
    let digest = Keccak256::digest(&bytes);
    state
        .stack
        .push(U256::from_be_bytes(digest.as_ref().try_into().unwrap_or([0; 32])))
}

fn charge(state: &mut ExecutionState<'_>, amount: u64) -> Result<(), ExecutionError> {
    let amount: i64 = amount.try_into().unwrap_or(i64::MAX);
    if state.gas_left < amount {
        state.gas_left = 0;
        return Err(ExecutionError::OutOfGas);
    }
    state.gas_left -= amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::analysis::Analysis;
    use crate::frame::{CallKind, Message};
    use crate::revision::Revision;

    #[test]
    fn keccak_of_empty_input_matches_known_hash() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let message = Message {
            kind: CallKind::Call,
            depth: 0,
            is_static: false,
            gas: 1_000_000,
            recipient: Address::ZERO,
            sender: Address::ZERO,
            input_data: Vec::new(),
            value: U256::zero(),
            code_address: Address::ZERO,
            create2_salt: U256::zero(),
        };
        let mut state = ExecutionState::new(message, &analysis, Revision::Cancun);
        state.stack.push(U256::zero()).unwrap();
        state.stack.push(U256::zero()).unwrap();
        keccak256(&mut state).unwrap();
        let result = state.stack.pop().unwrap();
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        let mut expected = [0u8; 32];
        hex::decode_to_slice(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a47",
            &mut expected,
        )
        .unwrap();
        assert_eq!(result, U256::from_be_bytes(&expected));
    }
}
