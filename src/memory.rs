//! Byte-addressable, word-granular volatile memory. Grows in 32-byte words and
//! bills the quadratic expansion cost (§4.2) the first time a given word is
//! touched; re-reading or re-writing already-resized memory is free.

use crate::gas::{memory_cost_for_words, word_count};
use crate::u256::U256;

#[derive(Debug, Clone, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Words currently allocated. `len()` is always a multiple of 32.
    pub fn words(&self) -> u64 {
        (self.data.len() as u64) / 32
    }

    /// The incremental gas cost of growing memory to cover `offset..offset+size`,
    /// or `None` if `offset + size` overflows a u64. A zero-size range never grows
    /// memory (matches the EVM's "zero-length access costs nothing" rule).
    pub fn expansion_cost(&self, offset: U256, size: U256) -> Option<u64> {
        if size.is_zero() {
            return Some(0);
        }
        if !offset.fits_u64() || !size.fits_u64() {
            return None;
        }
        let end = offset.as_u64().checked_add(size.as_u64())?;
        let new_words = word_count(end);
        if new_words <= self.words() {
            return Some(0);
        }
        let new_cost = memory_cost_for_words(new_words)?;
        let old_cost = memory_cost_for_words(self.words())?;
        Some(new_cost.saturating_sub(old_cost))
    }

    /// Grows the buffer to at least `offset + size` bytes, rounded up to a whole
    /// word. Caller must have already billed [`expansion_cost`] for this range.
    pub fn resize(&mut self, offset: usize, size: usize) {
        if size == 0 {
            return;
        }
        let required = offset.saturating_add(size);
        let words = required.div_ceil(32);
        let new_len = words * 32;
        if new_len > self.data.len() {
            self.data.resize(new_len, 0);
        }
    }

    pub fn load32(&mut self, offset: usize) -> U256 {
        self.resize(offset, 32);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.data[offset..offset + 32]);
        U256::from_be_bytes(&bytes)
    }

    pub fn store32(&mut self, offset: usize, value: U256) {
        self.resize(offset, 32);
        let bytes = value.to_be_bytes();
        self.data[offset..offset + 32].copy_from_slice(&bytes);
    }

    pub fn store8(&mut self, offset: usize, value: u8) {
        self.resize(offset, 1);
        self.data[offset] = value;
    }

    pub fn set(&mut self, offset: usize, bytes: &[u8]) {
        self.resize(offset, bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn get(&mut self, offset: usize, size: usize) -> Vec<u8> {
        self.resize(offset, size);
        self.data[offset..offset + size].to_vec()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_load_round_trip() {
        let mut mem = Memory::new();
        mem.store32(0, U256::from(0xdeadbeefu64));
        assert_eq!(mem.load32(0), U256::from(0xdeadbeefu64));
    }

    #[test]
    fn length_is_always_word_aligned() {
        let mut mem = Memory::new();
        mem.store8(5, 1);
        assert_eq!(mem.len() % 32, 0);
        assert_eq!(mem.len(), 32);
    }

    #[test]
    fn zero_size_access_costs_nothing() {
        let mem = Memory::new();
        assert_eq!(mem.expansion_cost(U256::from(1000u64), U256::zero()), Some(0));
    }

    #[test]
    fn expansion_cost_only_bills_the_delta() {
        let mut mem = Memory::new();
        let first = mem.expansion_cost(U256::zero(), U256::from(32u64)).unwrap();
        mem.resize(0, 32);
        let second = mem.expansion_cost(U256::zero(), U256::from(32u64)).unwrap();
        assert!(first > 0);
        assert_eq!(second, 0);
    }

    #[test]
    fn huge_offset_reports_overflow_as_none() {
        let mem = Memory::new();
        assert_eq!(mem.expansion_cost(U256::MAX, U256::one()), None);
    }
}
