//! System Operations (10)
//! Opcodes: CREATE, CALL, CALLCODE, RETURN, DELEGATECALL, CREATE2, STATICCALL,
//! REVERT, INVALID, SELFDESTRUCT
//!
//! CALL/CALLCODE/DELEGATECALL/STATICCALL/CREATE/CREATE2 all bottom out in
//! [`Host::call`] (§6): this engine never recurses into itself directly, so a
//! sub-frame's analysis, dispatch, and nested sub-calls are entirely the
//! host's business. CREATE's address derivation needs account nonces this
//! engine doesn't track, so that derivation lives on the host side too;
//! `ExecutionResult::create_address` carries it back.

use crate::address::Address;
use crate::errors::ExecutionError;
use crate::frame::{CallKind, ExecutionState, Message};
use crate::gas::{initcode_word_cost, keccak256_dynamic_cost, CALL_STIPEND, MAX_INITCODE_SIZE};
use crate::host::{AccessStatus, Host};
use crate::result::StatusCode;
use crate::u256::U256;

const VALUE_TRANSFER_COST: u64 = 9_000;
const NEW_ACCOUNT_COST: u64 = 25_000;

struct CallArgs {
    gas: U256,
    address: Address,
    value: U256,
    args_offset: U256,
    args_size: U256,
    ret_offset: U256,
    ret_size: U256,
}

fn pop_call_args(state: &mut ExecutionState<'_>, with_value: bool) -> Result<CallArgs, ExecutionError> {
    let gas = state.stack.pop()?;
    let address = address_from_word(state.stack.pop()?);
    let value = if with_value {
        state.stack.pop()?
    } else {
        U256::zero()
    };
    let args_offset = state.stack.pop()?;
    let args_size = state.stack.pop()?;
    let ret_offset = state.stack.pop()?;
    let ret_size = state.stack.pop()?;
    Ok(CallArgs {
        gas,
        address,
        value,
        args_offset,
        args_size,
        ret_offset,
        ret_size,
    })
}

fn address_from_word(word: U256) -> Address {
    let bytes = word.to_be_bytes();
    Address::from_slice(&bytes[12..])
}

/// `min(requested, available - available/64)`, clamped to non-negative (§4.6).
fn forward_gas(available: i64, requested: U256) -> i64 {
    let capped_available = available.max(0);
    let all_but_one_64th = capped_available - capped_available / 64;
    let requested_u64 = if requested.fits_u64() {
        requested.as_u64()
    } else {
        u64::MAX
    };
    let requested: i64 = requested_u64.try_into().unwrap_or(i64::MAX);
    all_but_one_64th.min(requested).max(0)
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

fn account_access_cost(state: &mut ExecutionState<'_>, host: &mut dyn Host, address: Address) -> u64 {
    if !state.revision.has_access_lists() {
        return 0;
    }
    match host.access_account(address) {
        AccessStatus::Cold => crate::gas::COLD_ACCOUNT_ACCESS_COST,
        AccessStatus::Warm => crate::gas::WARM_ACCESS_COST,
    }
}

/// Charges the incremental expansion cost for one memory window and, once
/// paid, grows memory to cover it. Separated from the read/write of the
/// window's bytes so both the ARGS and RET windows can be billed together,
/// before the call cost and the 63/64 rule are computed (§4.6 step 2 before
/// steps 3-4) -- billing one window only when its bytes are actually read or
/// written would let the other window's expansion slip past the gas check
/// that gates how much gas gets forwarded.
fn charge_memory_window(state: &mut ExecutionState<'_>, offset: U256, size: U256) -> Result<(), ExecutionError> {
    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost)?;
    if !size.is_zero() {
        state.memory.resize(offset.as_usize(), size.as_usize());
    }
    Ok(())
}

fn read_call_input(state: &mut ExecutionState<'_>, offset: U256, size: U256) -> Vec<u8> {
    if size.is_zero() {
        return Vec::new();
    }
    state.memory.get(offset.as_usize(), size.as_usize())
}

fn write_call_output(state: &mut ExecutionState<'_>, output: &[u8], ret_offset: U256, ret_size: U256) {
    if ret_size.is_zero() {
        return;
    }
    let copy_len = output.len().min(ret_size.as_usize());
    let mut bytes = vec![0u8; ret_size.as_usize()];
    bytes[..copy_len].copy_from_slice(&output[..copy_len]);
    state.memory.set(ret_offset.as_usize(), &bytes);
}

fn dispatch_call(
    state: &mut ExecutionState<'_>,
    host: &mut dyn Host,
    kind: CallKind,
    args: CallArgs,
    sender: Address,
    recipient: Address,
    code_address: Address,
    is_static: bool,
) -> Result<(), ExecutionError> {
    if state.message.is_static && !args.value.is_zero() {
        return Err(ExecutionError::StaticViolation);
    }
    if state.message.depth >= crate::frame::MAX_CALL_DEPTH {
        return Err(ExecutionError::CallDepth);
    }

    let mut cost = account_access_cost(state, host, args.address);
    let transfers_value = kind == CallKind::Call && !args.value.is_zero();
    if transfers_value {
        cost = cost.saturating_add(VALUE_TRANSFER_COST);
        if !host.account_exists(args.address) {
            cost = cost.saturating_add(NEW_ACCOUNT_COST);
        }
    }
    charge(state, cost)?;

    // Both windows are expanded and billed up front (§4.6 step 2), before the
    // call's own cost and the 63/64 rule are computed from what's left.
    charge_memory_window(state, args.args_offset, args.args_size)?;
    charge_memory_window(state, args.ret_offset, args.ret_size)?;
    let input_data = read_call_input(state, args.args_offset, args.args_size);

    let mut forwarded = forward_gas(state.gas_left, args.gas);
    if transfers_value {
        forwarded = forwarded.saturating_add(CALL_STIPEND as i64);
    }
    charge(state, forwarded.max(0) as u64)?;

    let message = Message {
        kind,
        depth: state.message.depth + 1,
        is_static,
        gas: forwarded,
        recipient,
        sender,
        input_data,
        value: args.value,
        code_address,
        create2_salt: U256::zero(),
    };

    tracing::trace!("entering {:?} at depth {} with {} gas forwarded", kind, message.depth, forwarded);
    let result = host.call(&message);
    tracing::trace!("returned from depth {}: status={:?}", message.depth, result.status);
    let returned_gas: i64 = result.gas_left.try_into().unwrap_or(i64::MAX);
    state.gas_left = state.gas_left.saturating_add(returned_gas);
    let returned_refund: i64 = result.gas_refund.try_into().unwrap_or(i64::MAX);
    state.gas_refund = state.gas_refund.saturating_add(returned_refund);
    state.return_data = result.output.clone();
    write_call_output(state, &result.output, args.ret_offset, args.ret_size);
    state.stack.push(if result.status.is_success() {
        U256::one()
    } else {
        U256::zero()
    })
}

pub fn call(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let args = pop_call_args(state, true)?;
    let sender = state.message.recipient;
    let address = args.address;
    let is_static = state.message.is_static;
    dispatch_call(state, host, CallKind::Call, args, sender, address, address, is_static)
}

pub fn callcode(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let args = pop_call_args(state, true)?;
    let sender = state.message.recipient;
    let recipient = state.message.recipient;
    let code_address = args.address;
    let is_static = state.message.is_static;
    dispatch_call(state, host, CallKind::CallCode, args, sender, recipient, code_address, is_static)
}

pub fn delegatecall(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let mut args = pop_call_args(state, false)?;
    args.value = state.message.value;
    let sender = state.message.sender;
    let recipient = state.message.recipient;
    let code_address = args.address;
    let is_static = state.message.is_static;
    dispatch_call(state, host, CallKind::DelegateCall, args, sender, recipient, code_address, is_static)
}

pub fn staticcall(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let args = pop_call_args(state, false)?;
    let sender = state.message.recipient;
    let address = args.address;
    dispatch_call(state, host, CallKind::StaticCall, args, sender, address, address, true)
}

fn dispatch_create(
    state: &mut ExecutionState<'_>,
    host: &mut dyn Host,
    kind: CallKind,
    salt: U256,
) -> Result<(), ExecutionError> {
    if state.message.is_static {
        return Err(ExecutionError::StaticViolation);
    }
    if state.message.depth >= crate::frame::MAX_CALL_DEPTH {
        return Err(ExecutionError::CallDepth);
    }

    let value = state.stack.pop()?;
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    if size.fits_u64() && size.as_usize() > MAX_INITCODE_SIZE && state.revision.has_initcode_cost() {
        return Err(ExecutionError::OutOfGas);
    }

    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    let mut dynamic_cost = memory_cost;
    if kind == CallKind::Create2 {
        dynamic_cost = dynamic_cost.saturating_add(
            size.fits_u64()
                .then(|| keccak256_dynamic_cost(size.as_u64()))
                .flatten()
                .ok_or(ExecutionError::OutOfMemory)?,
        );
    }
    dynamic_cost = dynamic_cost.saturating_add(initcode_word_cost(state.revision, size.as_usize()));
    charge(state, dynamic_cost)?;

    let init_code = if size.is_zero() {
        Vec::new()
    } else {
        state.memory.get(offset.as_usize(), size.as_usize())
    };

    let forwarded = forward_gas(state.gas_left, U256::from(u64::MAX));
    charge(state, forwarded.max(0) as u64)?;

    let message = Message {
        kind,
        depth: state.message.depth + 1,
        is_static: false,
        gas: forwarded,
        recipient: Address::ZERO,
        sender: state.message.recipient,
        input_data: init_code,
        value,
        code_address: Address::ZERO,
        create2_salt: salt,
    };

    let result = host.call(&message);
    let returned_gas: i64 = result.gas_left.try_into().unwrap_or(i64::MAX);
    state.gas_left = state.gas_left.saturating_add(returned_gas);
    let returned_refund: i64 = result.gas_refund.try_into().unwrap_or(i64::MAX);
    state.gas_refund = state.gas_refund.saturating_add(returned_refund);
    state.return_data = result.output;

    match result.create_address {
        Some(address) if result.status.is_success() => {
            let mut bytes = [0u8; 32];
            bytes[12..].copy_from_slice(&address);
            state.stack.push(U256::from_be_bytes(&bytes))
        }
        _ => state.stack.push(U256::zero()),
    }
}

pub fn create(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    dispatch_create(state, host, CallKind::Create, U256::zero())
}

pub fn create2(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    // Stack order is value, offset, size, salt; pop salt here and hand the
    // rest back to dispatch_create in the order it already expects for CREATE.
    let value = state.stack.pop()?;
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;
    let salt = state.stack.pop()?;
    state.stack.push(size)?;
    state.stack.push(offset)?;
    state.stack.push(value)?;
    dispatch_create(state, host, CallKind::Create2, salt)
}

pub fn do_return(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;
    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost)?;
    state.output = if size.is_zero() {
        Vec::new()
    } else {
        state.memory.get(offset.as_usize(), size.as_usize())
    };
    state.status = Some(StatusCode::Success);
    Ok(())
}

pub fn revert(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;
    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost)?;
    state.output = if size.is_zero() {
        Vec::new()
    } else {
        state.memory.get(offset.as_usize(), size.as_usize())
    };
    state.status = Some(StatusCode::Revert);
    Ok(())
}

pub fn invalid(_state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    Err(ExecutionError::InvalidInstruction)
}

pub fn selfdestruct(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    if state.message.is_static {
        return Err(ExecutionError::StaticViolation);
    }
    let beneficiary = address_from_word(state.stack.pop()?);

    // The flat base cost is already prepaid via the block's base gas (§4.2,
    // gas::opcode_info); only the cold-access and new-account surcharges are
    // computed here.
    let mut cost = 0u64;
    if state.revision.has_access_lists() && host.access_account(beneficiary) == AccessStatus::Cold {
        cost = cost.saturating_add(crate::gas::COLD_ACCOUNT_ACCESS_COST);
    }
    let balance = host.get_balance(state.message.recipient);
    if !balance.is_zero() && !host.account_exists(beneficiary) {
        cost = cost.saturating_add(NEW_ACCOUNT_COST);
    }
    charge(state, cost)?;

    host.selfdestruct(state.message.recipient, beneficiary);
    if !state.revision.has_reduced_refunds() {
        state.gas_refund += 24_000;
    }
    state.status = Some(StatusCode::Success);
    Ok(())
}
