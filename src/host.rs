//! The engine's only outbound dependency (§6). Everything the engine knows
//! about accounts, storage, and the wider chain state comes through this
//! trait; the engine never touches a trie, a database, or a precompile table
//! directly.

use crate::address::Address;
use crate::frame::Message;
use crate::result::ExecutionResult;
use crate::u256::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Cold,
    Warm,
}

/// The seven SSTORE transitions the gas/refund rules (EIP-2200/EIP-3529) key off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    Unchanged,
    Modified,
    Deleted,
    Added,
    ModifiedRestored,
    AddedDeleted,
    ModifiedDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub origin: Address,
    pub gas_price: U256,
    pub coinbase: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub gas_limit: u64,
    pub prev_randao: U256,
    pub chain_id: U256,
    pub base_fee: U256,
    pub blob_base_fee: U256,
}

pub trait Host {
    fn account_exists(&mut self, address: Address) -> bool;

    fn get_storage(&mut self, address: Address, key: U256) -> U256;

    fn set_storage(&mut self, address: Address, key: U256, value: U256) -> StorageStatus;

    fn get_balance(&mut self, address: Address) -> U256;

    fn get_code_size(&mut self, address: Address) -> usize;

    /// The empty-code hash (EIP-1052) when the account has no code or doesn't exist.
    fn get_code_hash(&mut self, address: Address) -> U256;

    /// Copies up to `dst.len()` bytes of `address`'s code starting at `offset` into
    /// `dst`, zero-padding past the end; returns the number of live bytes copied.
    fn copy_code(&mut self, address: Address, offset: usize, dst: &mut [u8]) -> usize;

    fn selfdestruct(&mut self, address: Address, beneficiary: Address);

    /// The sole re-entry point into the engine for CALL/CALLCODE/DELEGATECALL/
    /// STATICCALL/CREATE/CREATE2 sub-frames.
    fn call(&mut self, message: &Message) -> ExecutionResult;

    fn get_tx_context(&mut self) -> TxContext;

    /// Zero when `n >= current_block` or `current_block - n > 256`.
    fn get_block_hash(&mut self, block_number: u64) -> U256;

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[U256]);

    fn access_account(&mut self, address: Address) -> AccessStatus;

    fn access_storage(&mut self, address: Address, key: U256) -> AccessStatus;

    fn get_transient_storage(&mut self, address: Address, key: U256) -> U256;

    fn set_transient_storage(&mut self, address: Address, key: U256, value: U256);

    /// The `index`-th versioned blob hash of the enclosing transaction (EIP-4844),
    /// or `U256::zero()` if `index` is out of range.
    fn get_blob_hash(&mut self, index: usize) -> U256;
}
