//! Environmental Information (17)
//! Opcodes: ADDRESS, BALANCE, ORIGIN, CALLER, CALLVALUE, CALLDATALOAD,
//! CALLDATASIZE, CALLDATACOPY, CODESIZE, CODECOPY, GASPRICE, EXTCODESIZE,
//! EXTCODECOPY, RETURNDATASIZE, RETURNDATACOPY, EXTCODEHASH, SELFBALANCE,
//! BLOBHASH

use crate::address::Address;
use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::copy_dynamic_cost;
use crate::host::{AccessStatus, Host};
use crate::u256::U256;

fn address_to_word(address: Address) -> U256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(&address.0);
    U256::from_be_bytes(&bytes)
}

pub fn address(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state.stack.push(address_to_word(state.message.recipient))
}

pub fn balance(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let word = state.stack.pop()?;
    let address = address_from_word(word);
    if state.revision.has_access_lists() {
        let cost = match host.access_account(address) {
            AccessStatus::Cold => crate::gas::COLD_ACCOUNT_ACCESS_COST,
            AccessStatus::Warm => crate::gas::WARM_ACCESS_COST,
        };
        charge(state, cost)?;
    }
    state.stack.push(host.get_balance(address))
}

pub fn selfbalance(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let value = host.get_balance(state.message.recipient);
    state.stack.push(value)
}

pub fn origin(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(address_to_word(ctx.origin))
}

pub fn caller(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state.stack.push(address_to_word(state.message.sender))
}

pub fn callvalue(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state.stack.push(state.message.value)
}

pub fn gasprice(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(ctx.gas_price)
}

pub fn calldataload(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let mut bytes = [0u8; 32];
    if offset.fits_u64() {
        let offset = offset.as_usize();
        let input = &state.message.input_data;
        for (i, slot) in bytes.iter_mut().enumerate() {
            *slot = input.get(offset + i).copied().unwrap_or(0);
        }
    }
    state.stack.push(U256::from_be_bytes(&bytes))
}

pub fn calldatasize(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state
        .stack
        .push(U256::from(state.message.input_data.len() as u64))
}

pub fn calldatacopy(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let dest_offset = state.stack.pop()?;
    let data_offset = state.stack.pop()?;
    let size = state.stack.pop()?;
    charge_copy(state, dest_offset, size)?;
    if size.is_zero() {
        return Ok(());
    }
    let bytes = read_padded(&state.message.input_data, data_offset, size.as_usize());
    state.memory.set(dest_offset.as_usize(), &bytes);
    Ok(())
}

pub fn returndatasize(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state
        .stack
        .push(U256::from(state.return_data.len() as u64))
}

pub fn returndatacopy(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let dest_offset = state.stack.pop()?;
    let data_offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    if !data_offset.fits_u64() || !size.fits_u64() {
        return Err(ExecutionError::OutOfMemory);
    }
    let end = data_offset
        .as_u64()
        .checked_add(size.as_u64())
        .ok_or(ExecutionError::OutOfMemory)?;
    if end > state.return_data.len() as u64 {
        return Err(ExecutionError::OutOfMemory);
    }

    charge_copy(state, dest_offset, size)?;
    if size.is_zero() {
        return Ok(());
    }
    let slice = &state.return_data[data_offset.as_usize()..data_offset.as_usize() + size.as_usize()];
    let bytes = slice.to_vec();
    state.memory.set(dest_offset.as_usize(), &bytes);
    Ok(())
}

pub fn codesize(state: &mut ExecutionState<'_>, code: &[u8]) -> Result<(), ExecutionError> {
    state.stack.push(U256::from(code.len() as u64))
}

pub fn codecopy(state: &mut ExecutionState<'_>, code: &[u8]) -> Result<(), ExecutionError> {
    let dest_offset = state.stack.pop()?;
    let code_offset = state.stack.pop()?;
    let size = state.stack.pop()?;
    charge_copy(state, dest_offset, size)?;
    if size.is_zero() {
        return Ok(());
    }
    let bytes = read_padded(code, code_offset, size.as_usize());
    state.memory.set(dest_offset.as_usize(), &bytes);
    Ok(())
}

pub fn extcodesize(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let word = state.stack.pop()?;
    let address = address_from_word(word);
    if state.revision.has_access_lists() {
        let cost = match host.access_account(address) {
            AccessStatus::Cold => crate::gas::COLD_ACCOUNT_ACCESS_COST,
            AccessStatus::Warm => crate::gas::WARM_ACCESS_COST,
        };
        charge(state, cost)?;
    }
    state.stack.push(U256::from(host.get_code_size(address) as u64))
}

pub fn extcodehash(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let word = state.stack.pop()?;
    let address = address_from_word(word);
    if state.revision.has_access_lists() {
        let cost = match host.access_account(address) {
            AccessStatus::Cold => crate::gas::COLD_ACCOUNT_ACCESS_COST,
            AccessStatus::Warm => crate::gas::WARM_ACCESS_COST,
        };
        charge(state, cost)?;
    }
    state.stack.push(host.get_code_hash(address))
}

pub fn extcodecopy(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let word = state.stack.pop()?;
    let address = address_from_word(word);
    let dest_offset = state.stack.pop()?;
    let code_offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    if state.revision.has_access_lists() {
        let cost = match host.access_account(address) {
            AccessStatus::Cold => crate::gas::COLD_ACCOUNT_ACCESS_COST,
            AccessStatus::Warm => crate::gas::WARM_ACCESS_COST,
        };
        charge(state, cost)?;
    }
    charge_copy(state, dest_offset, size)?;
    if size.is_zero() {
        return Ok(());
    }
    let mut buffer = vec![0u8; size.as_usize()];
    host.copy_code(address, code_offset.as_usize(), &mut buffer);
    state.memory.set(dest_offset.as_usize(), &buffer);
    Ok(())
}

pub fn blobhash(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let index = state.stack.pop()?;
    if !index.fits_u64() {
        return state.stack.push(U256::zero());
    }
    let value = host.get_blob_hash(index.as_usize());
    state.stack.push(value)
}

fn address_from_word(word: U256) -> Address {
    let bytes = word.to_be_bytes();
    Address::from_slice(&bytes[12..])
}

fn read_padded(source: &[u8], offset: U256, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    if !offset.fits_u64() {
        return out;
    }
    let offset = offset.as_usize();
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = source.get(offset + i).copied().unwrap_or(0);
    }
    out
}

fn charge_copy(state: &mut ExecutionState<'_>, dest_offset: U256, size: U256) -> Result<(), ExecutionError> {
    let memory_cost = state
        .memory
        .expansion_cost(dest_offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    let copy_cost = size
        .fits_u64()
        .then(|| copy_dynamic_cost(size.as_u64()))
        .flatten()
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost.saturating_add(copy_cost))?;
    if !size.is_zero() {
        state.memory.resize(dest_offset.as_usize(), size.as_usize());
    }
    Ok(())
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
