//! Arithmetic Operations (11)
//! Opcodes: ADD, SUB, MUL, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND
//!
//! Base costs were already prepaid by the enclosing block's BEGINBLOCK handler
//! (§4.3); these functions only perform the operation and, for EXP, the
//! additional byte-length-dependent charge (§4.2).

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::exp_dynamic_cost;
use crate::i256;
use crate::u256::U256;

pub fn add(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.overflowing_add(b).0)
}

pub fn sub(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.overflowing_sub(b).0)
}

pub fn mul(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.overflowing_mul(b).0)
}

pub fn div(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.checked_div(b).unwrap_or_else(U256::zero))
}

pub fn sdiv(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(i256::signed_div(a, b))
}

pub fn modulo(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.checked_rem(b).unwrap_or_else(U256::zero))
}

pub fn smod(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(i256::signed_mod(a, b))
}

pub fn addmod(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    let n = state.stack.pop()?;
    state.stack.push(U256::add_mod(a, b, n))
}

pub fn mulmod(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    let n = state.stack.pop()?;
    state.stack.push(U256::mul_mod(a, b, n))
}

pub fn exp(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let base = state.stack.pop()?;
    let exponent = state.stack.pop()?;
    let dynamic_cost = exp_dynamic_cost(state.revision, exponent)
        .map(|c| c.saturating_sub(10))
        .unwrap_or(u64::MAX);
    charge(state, dynamic_cost)?;
    state.stack.push(base.overflowing_pow(exponent).0)
}

/// SIGNEXTEND(k, x): sign-extend `x` from bit `8k+7`; `k >= 31` returns `x` unchanged.
pub fn signextend(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let k = state.stack.pop()?;
    let x = state.stack.pop()?;
    if !k.fits_u64() || k.as_u64() >= 31 {
        return state.stack.push(x);
    }
    let sign_bit_index = 8 * k.as_usize() + 7;
    let mask = U256::one()
        .shl_u32((sign_bit_index + 1) as u32)
        .overflowing_sub(U256::one())
        .0;
    let result = if x.bit(sign_bit_index) {
        x | !mask
    } else {
        x & mask
    };
    state.stack.push(result)
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
    fn add_wraps_on_overflow() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::MAX).unwrap();
        state.stack.push(U256::one()).unwrap();
        add(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::zero());
    }

    #[test]
    fn div_by_zero_is_zero() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::zero()).unwrap();
        state.stack.push(U256::from(5u64)).unwrap();
        div(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::zero());
    }

    #[test]
    fn signextend_of_small_k_extends_sign() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::from(0xffu64)).unwrap();
        state.stack.push(U256::zero()).unwrap();
        signextend(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::MAX);
    }

    #[test]
    fn signextend_beyond_31_is_identity() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.stack.push(U256::from(0xffu64)).unwrap();
        state.stack.push(U256::from(31u64)).unwrap();
        signextend(&mut state).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::from(0xffu64));
    }
}
