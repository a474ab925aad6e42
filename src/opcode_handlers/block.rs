//! Block Information (9)
//! Opcodes: BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, PREVRANDAO, GASLIMIT,
//! CHAINID, BASEFEE, BLOBBASEFEE

use crate::address::Address;
use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::host::Host;
use crate::u256::U256;

fn address_to_word(address: Address) -> U256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(&address.0);
    U256::from_be_bytes(&bytes)
}

pub fn blockhash(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let number = state.stack.pop()?;
    if !number.fits_u64() {
        return state.stack.push(U256::zero());
    }
    let requested = number.as_u64();
    let value = host.get_block_hash(requested);
    let current = host.get_tx_context().block_number;
    let in_window = requested < current && current.saturating_sub(requested) <= 256;
    if !in_window && !value.is_zero() {
        tracing::warn!(
            "host returned a nonzero block hash for {} outside the 256-block window (current block {})",
            requested,
            current
        );
    }
    state.stack.push(value)
}

pub fn coinbase(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(address_to_word(ctx.coinbase))
}

pub fn timestamp(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(U256::from(ctx.block_timestamp))
}

pub fn number(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(U256::from(ctx.block_number))
}

pub fn prevrandao(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(ctx.prev_randao)
}

pub fn gaslimit(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(U256::from(ctx.gas_limit))
}

pub fn chainid(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(ctx.chain_id)
}

pub fn basefee(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(ctx.base_fee)
}

pub fn blobbasefee(state: &mut ExecutionState<'_>, host: &mut dyn Host) -> Result<(), ExecutionError> {
    let ctx = host.get_tx_context();
    state.stack.push(ctx.blob_base_fee)
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn blockhash_out_of_u64_range_is_zero() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        let mut host = MockHost::default();
        state.stack.push(U256::MAX).unwrap();
        blockhash(&mut state, &mut host).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::zero());
    }

    #[test]
    fn chainid_reports_the_tx_context_value() {
        let analysis = Analysis::analyze(&[0x00], Revision::Cancun);
        let mut state = fresh_state(&analysis);
        let mut host = MockHost::default();
        chainid(&mut state, &mut host).unwrap();
        assert_eq!(state.stack.pop().unwrap(), U256::one());
    }
}
