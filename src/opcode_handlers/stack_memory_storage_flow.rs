//! Stack, Memory, Storage and Flow Operations (15)
//! Opcodes: POP, MLOAD, MSTORE, MSTORE8, SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE,
//! GAS, JUMPDEST, TLOAD, TSTORE, MCOPY

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::{COLD_SLOAD_COST, WARM_SLOAD_COST, WORD_SIZE};
use crate::host::{AccessStatus, Host, StorageStatus};
use crate::revision::Revision;
use crate::u256::U256;

pub fn pop(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state.stack.pop()?;
    Ok(())
}

pub fn mload(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    charge_memory(state, offset, U256::from(WORD_SIZE))?;
    let value = state.memory.load32(offset.as_usize());
    state.stack.push(value)
}

pub fn mstore(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let value = state.stack.pop()?;
    charge_memory(state, offset, U256::from(WORD_SIZE))?;
    state.memory.store32(offset.as_usize(), value);
    Ok(())
}

pub fn mstore8(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.stack.pop()?;
    let value = state.stack.pop()?;
    charge_memory(state, offset, U256::one())?;
    let byte = value.to_be_bytes()[31];
    state.memory.store8(offset.as_usize(), byte);
    Ok(())
}

pub fn mcopy(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let dest_offset = state.stack.pop()?;
    let src_offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    let high_watermark = dest_offset.max(src_offset);
    charge_memory(state, high_watermark, size)?;
    charge(
        state,
        crate::gas::copy_dynamic_cost(size.as_u64()).ok_or(ExecutionError::OutOfMemory)?,
    )?;

    if size.is_zero() {
        return Ok(());
    }
    let bytes = state.memory.get(src_offset.as_usize(), size.as_usize());
    state.memory.set(dest_offset.as_usize(), &bytes);
    Ok(())
}

pub fn msize(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    state.stack.push(U256::from(state.memory.len() as u64))
}

pub fn pc(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let offset = state.analysis.byte_offset(state.pc);
    state.stack.push(U256::from(offset))
}

/// Reports the gas that will remain once GAS's own (already-prepaid) cost is
/// accounted for (§9 open question 2: block-level prepayment must not leak
/// into what the contract observes).
pub fn gas(state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    let remaining = state.instruction_granular_gas_left().max(0);
    state.stack.push(U256::from(remaining as u64))
}

pub fn jumpdest(_state: &mut ExecutionState<'_>) -> Result<(), ExecutionError> {
    // Absorbed into the analyzer's block-begin accounting (§4.3 rule 4); a
    // dispatched JUMPDEST is always a no-op.
    Ok(())
}

/// Returns the resolved instruction-stream index, or `BadJumpDest` if `target`
/// isn't a JUMPDEST.
pub fn jump(state: &mut ExecutionState<'_>) -> Result<usize, ExecutionError> {
    let target = state.stack.pop()?;
    resolve(state, target)
}

pub fn jumpi(state: &mut ExecutionState<'_>) -> Result<Option<usize>, ExecutionError> {
    let target = state.stack.pop()?;
    let condition = state.stack.pop()?;
    if condition.is_zero() {
        return Ok(None);
    }
    resolve(state, target).map(Some)
}

fn resolve(state: &ExecutionState<'_>, target: U256) -> Result<usize, ExecutionError> {
    if !target.fits_u64() {
        return Err(ExecutionError::BadJumpDest);
    }
    state
        .analysis
        .resolve_jump(target.as_u64())
        .ok_or(ExecutionError::BadJumpDest)
}

pub fn sload(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let key = state.stack.pop()?;
    let address = state.message.recipient;

    if state.revision.has_access_lists() {
        let cost = match host.access_storage(address, key) {
            AccessStatus::Cold => COLD_SLOAD_COST,
            AccessStatus::Warm => WARM_SLOAD_COST,
        };
        charge(state, cost)?;
    }

    let value = host.get_storage(address, key);
    state.stack.push(value)
}

pub fn sstore(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    if state.message.is_static {
        return Err(ExecutionError::StaticViolation);
    }
    // EIP-2200: SSTORE may not run with less than the call stipend remaining.
    const SSTORE_STIPEND: i64 = 2_300;
    if state.revision.at_least(Revision::Istanbul) && state.gas_left <= SSTORE_STIPEND {
        return Err(ExecutionError::OutOfGas);
    }

    let key = state.stack.pop()?;
    let value = state.stack.pop()?;
    let address = state.message.recipient;

    let mut cost = 0u64;
    if state.revision.has_access_lists() {
        if host.access_storage(address, key) == AccessStatus::Cold {
            cost = cost.saturating_add(COLD_SLOAD_COST);
        }
    }

    let status = host.set_storage(address, key, value);
    let (status_cost, refund) = sstore_cost_and_refund(state.revision, status);
    cost = cost.saturating_add(status_cost);

    charge(state, cost)?;
    state.gas_refund += refund;
    Ok(())
}

/// The net-metering cost/refund table keyed by the storage transition the host
/// reports (§4.2, EIP-2200/EIP-2929/EIP-3529). Cold-access surcharge is billed
/// separately; these numbers are the "already warm" component.
fn sstore_cost_and_refund(revision: Revision, status: StorageStatus) -> (u64, i64) {
    let clears_refund: i64 = if revision.has_reduced_refunds() { 4_800 } else { 15_000 };
    if revision.has_access_lists() {
        match status {
            StorageStatus::Unchanged => (100, 0),
            StorageStatus::Added => (20_000, 0),
            StorageStatus::Modified => (2_900, 0),
            StorageStatus::Deleted => (2_900, clears_refund),
            StorageStatus::ModifiedRestored => (100, -clears_refund),
            StorageStatus::AddedDeleted => (100, -19_900),
            StorageStatus::ModifiedDeleted => (100, clears_refund - 2_800),
        }
    } else {
        match status {
            StorageStatus::Unchanged => (800, 0),
            StorageStatus::Added => (20_000, 0),
            StorageStatus::Modified => (5_000, 0),
            StorageStatus::Deleted => (5_000, clears_refund),
            StorageStatus::ModifiedRestored => (800, -clears_refund),
            StorageStatus::AddedDeleted => (800, -19_200),
            StorageStatus::ModifiedDeleted => (800, clears_refund - 4_200),
        }
    }
}

pub fn tload(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let key = state.stack.pop()?;
    let value = host.get_transient_storage(state.message.recipient, key);
    state.stack.push(value)
}

pub fn tstore(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    if state.message.is_static {
        return Err(ExecutionError::StaticViolation);
    }
    let key = state.stack.pop()?;
    let value = state.stack.pop()?;
    host.set_transient_storage(state.message.recipient, key, value);
    Ok(())
}

fn charge_memory(state: &mut ExecutionState<'_>, offset: U256, size: U256) -> Result<(), ExecutionError> {
    let cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, cost)?;
    state
        .memory
        .resize(offset.as_usize(), size.as_usize());
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
