//! Comparison and Bitwise Logic Operations (14)
//! Opcodes: LT, GT, SLT, SGT, EQ, ISZERO, AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::i256;
use crate::u256::U256;
use std::cmp::Ordering;

fn push_bool(state: &mut ExecutionState<'_>, value: bool) -> Result<(), ExecutionError> {
    state.stack.push(if value { U256::one() } else { U256::zero() })
}

pub fn lt(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    push_bool(state, a < b)
}

pub fn gt(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    push_bool(state, a > b)
}

pub fn slt(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    push_bool(state, i256::signed_cmp(a, b) == Ordering::Less)
}

pub fn sgt(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    push_bool(state, i256::signed_cmp(a, b) == Ordering::Greater)
}

pub fn eq(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    push_bool(state, a == b)
}

pub fn iszero(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    push_bool(state, a.is_zero())
}

pub fn and(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a & b)
}

pub fn or(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a | b)
}

pub fn xor(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a ^ b)
}

pub fn not(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    state.stack.push(!a)
}

/// BYTE(i, x): the `i`-th byte of `x` counting from the most significant, 0 if
/// `i >= 32`.
pub fn byte(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let index = state.stack.pop()?;
    let value = state.stack.pop()?;
    if !index.fits_u64() || index.as_u64() >= 32 {
        return state.stack.push(U256::zero());
    }
    let bytes = value.to_be_bytes();
    state.stack.push(U256::from(u64::from(bytes[index.as_usize()])))
}

pub fn shl(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let shift = state.stack.pop()?;
    let value = state.stack.pop()?;
    state.stack.push(value.shl(shift))
}

pub fn shr(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let shift = state.stack.pop()?;
    let value = state.stack.pop()?;
    state.stack.push(value.shr(shift))
}

pub fn sar(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let shift = state.stack.pop()?;
    let value = state.stack.pop()?;
    state.stack.push(i256::arithmetic_shift_right(value, shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::analysis::Analysis;
    use crate::frame::{CallKind, Message};
    use crate::revision::Revision;

    fn fresh_state(analysis: &Analysis) -> ExecutionState<'_> {
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
        ExecutionState::new(message, analysis, Revision::Cancun)
    }

    #[test]
    fn byte_extracts_the_requested_byte_big_endian() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::from(0xabu64)).unwrap();
        state.stack.push(U256::from(31u64)).unwrap();
        byte(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::from(0xabu64));
    }

    #[test]
    fn byte_index_out_of_range_is_zero() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::from(0xabu64)).unwrap();
        state.stack.push(U256::from(32u64)).unwrap();
        byte(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::zero());
    }

    #[test]
    fn shl_and_shr_are_logical() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::from(1u64)).unwrap();
        state.stack.push(U256::from(1u64)).unwrap();
        shl(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::from(2u64));
    }
}
