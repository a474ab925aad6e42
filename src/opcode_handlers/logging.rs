//! Logging Operations (5)
//! Opcodes: LOG0 ... LOG4
//!
//! The topic-count component of LOG's cost is already folded into the block's
//! prepaid base cost (§4.2, gas::opcode_info); this handler only charges the
//! memory-expansion and per-byte data costs neither table can know in advance.

use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::log_data_cost;
use crate::host::Host;
use crate::u256::U256;

pub fn log(
    state: &mut ExecutionState<'_>,
    host: &mut dyn Host,
    topic_count: usize,
) -> Result<(), ExecutionError> {
    if state.message.is_static {
        return Err(ExecutionError::StaticViolation);
    }

    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    let mut topics = Vec::with_capacity(topic_count);
    for _ in 0..topic_count {
        topics.push(state.stack.pop()?);
    }

    let memory_cost = state
        .memory
        .expansion_cost(offset, size)
        .ok_or(ExecutionError::OutOfMemory)?;
    let data_cost = size
        .fits_u64()
        .then(|| log_data_cost(size.as_u64()))
        .flatten()
        .ok_or(ExecutionError::OutOfMemory)?;
    charge(state, memory_cost.saturating_add(data_cost))?;

    let data = if size.is_zero() {
        Vec::new()
    } else {
        state.memory.get(offset.as_usize(), size.as_usize())
    };
    host.emit_log(state.message.recipient, &data, &topics);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::analysis::Analysis;
    use crate::frame::{CallKind, Message};
    use crate::host::test_support::MockHost;
    use crate::revision::Revision;

    fn fresh_state(analysis: &Analysis) -> ExecutionState<'_> {
        let message = Message {
            kind: CallKind::Call,
            depth: 0,
            is_static: false,
            gas: 1_000_000,
            recipient: Address::from_slice(&[7]),
            sender: Address::ZERO,
            input_data: Vec::new(),
            value: U256::zero(),
            code_address: Address::ZERO,
            create2_salt: U256::zero(),
        };
        ExecutionState::new(message, analysis, Revision::Cancun)
    }

    #[test]
    fn log_with_one_topic_records_address_data_and_topic() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        let mut host = MockHost::default();
        state.memory.set(0, b"hi");
        state.stack.push(U256::from(42u64)).unwrap(); // topic
        state.stack.push(U256::from(2u64)).unwrap(); // size
        state.stack.push(U256::zero()).unwrap(); // offset
        log(&mut state, &mut host, 1).unwrap();
        assert_eq!(host.logs.len(), 1);
        assert_eq!(host.logs[0].0, state.message.recipient);
        assert_eq!(host.logs[0].1, b"hi");
        assert_eq!(host.logs[0].2, vec![U256::from(42u64)]);
    }

    #[test]
    fn log_in_static_context_is_rejected() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        state.message.is_static = true;
        let mut host = MockHost::default();
        state.stack.push(U256::zero()).unwrap();
        state.stack.push(U256::zero()).unwrap();
        assert_eq!(
            log(&mut state, &mut host, 0),
            Err(ExecutionError::StaticViolation)
        );
    }
}
