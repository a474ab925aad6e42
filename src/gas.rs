//! Per-revision gas schedule: a pure table from `(Revision, Opcode)` to
//! `(base_cost, stack_in, stack_delta)`, plus the dynamic-cost formulas that
//! instruction handlers apply on top of the base cost.
//!
//! The table is a `const fn` over static data rather than a lazily-built
//! global: these costs never change at runtime, so there is nothing to cache.

use crate::opcode::Opcode;
use crate::revision::Revision;
use crate::u256::U256;

pub const STACK_LIMIT: usize = 1024;
pub const WORD_SIZE: u64 = 32;
pub const MEMORY_EXPANSION_QUOTIENT: u64 = 512;
pub const GAS_REFUND_DENOMINATOR_PRE_LONDON: u64 = 2;
pub const GAS_REFUND_DENOMINATOR: u64 = 5;
pub const MAX_CODE_SIZE: usize = 0x6000;
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;
pub const CALL_STIPEND: u64 = 2300;
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
pub const WARM_ACCESS_COST: u64 = 100;
pub const COLD_SLOAD_COST: u64 = 2100;
pub const WARM_SLOAD_COST: u64 = 100;
pub const ACCESS_LIST_ADDRESS_COST: u64 = 2400;
pub const ACCESS_LIST_STORAGE_KEY_COST: u64 = 1900;

/// Per-opcode entry in the gas schedule: base cost plus the stack shape used by
/// the analyzer to precompute a block's minimum stack height and maximum growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub base_cost: u64,
    pub stack_in: u16,
    pub stack_delta: i16,
}

const fn op(base_cost: u64, stack_in: u16, stack_delta: i16) -> OpcodeInfo {
    OpcodeInfo {
        base_cost,
        stack_in,
        stack_delta,
    }
}

const UNDEFINED: OpcodeInfo = op(0, 0, 0);

/// Look up the `(base_cost, stack_in, stack_delta)` triple for `opcode` at `revision`.
/// Undefined opcodes return a zero-cost, zero-stack entry: the analyzer still emits a
/// handler for them, and that handler is the one that fails with "undefined instruction",
/// not the gas/stack accounting (see §4.3 rule 2 and §3 "Opcode").
pub const fn opcode_info(revision: Revision, opcode: Opcode) -> OpcodeInfo {
    use Opcode::*;
    match opcode {
        Stop => op(0, 0, 0),
        Add | Sub | Lt | Gt | SLt | SGt | Eq | And | Or | Xor | Byte | Shl | Shr | Sar => {
            op(3, 2, -1)
        }
        Mul | Div | SDiv | Mod | SMod | SignExtend => op(5, 2, -1),
        AddMod | MulMod => op(8, 3, -2),
        Exp => op(10, 2, -1),
        IsZero | Not => op(3, 1, 0),
        Keccak256 => op(30, 2, -1),
        Address | Origin | Caller | CallValue | CallDataSize | CodeSize | GasPrice
        | ReturnDataSize | Coinbase | Timestamp | Number | GasLimit | ChainId | BaseFee
        | Pc | MSize | Gas | PrevRandao | BlobBaseFee => op(2, 0, 1),
        Balance => {
            if revision.has_access_lists() {
                op(0, 1, 0)
            } else if revision.at_least(Revision::Tangerine) {
                op(400, 1, 0)
            } else {
                op(20, 1, 0)
            }
        }
        CallDataLoad => op(3, 1, 0),
        CallDataCopy | CodeCopy | ReturnDataCopy => op(3, 3, -3),
        ExtCodeSize => {
            if revision.has_access_lists() {
                op(0, 1, 0)
            } else if revision.at_least(Revision::Tangerine) {
                op(700, 1, 0)
            } else {
                op(20, 1, 0)
            }
        }
        ExtCodeCopy => {
            let base = if revision.has_access_lists() {
                0
            } else if revision.at_least(Revision::Tangerine) {
                700
            } else {
                20
            };
            op(base, 4, -4)
        }
        ExtCodeHash => {
            if revision.has_access_lists() {
                op(0, 1, 0)
            } else if revision.at_least(Revision::Istanbul) {
                op(700, 1, 0)
            } else {
                op(400, 1, 0)
            }
        }
        BlockHash => op(20, 1, 0),
        SelfBalance => op(5, 0, 1),
        BlobHash => op(3, 1, 0),
        Pop => op(2, 1, -1),
        MLoad | MStore => op(3, if matches!(opcode, MLoad) { 1 } else { 2 }, stack_delta_for_mem(opcode)),
        MStore8 => op(3, 2, -2),
        SLoad => {
            if revision.has_access_lists() {
                op(0, 1, 0)
            } else if revision.at_least(Revision::Istanbul) {
                op(800, 1, 0)
            } else if revision.at_least(Revision::Tangerine) {
                op(200, 1, 0)
            } else {
                op(50, 1, 0)
            }
        }
        SStore => op(0, 2, -2),
        Jump => op(8, 1, -1),
        Jumpi => op(10, 2, -2),
        JumpDest => op(1, 0, 0),
        TLoad => op(100, 1, 0),
        TStore => op(100, 2, -2),
        MCopy => op(3, 3, -3),
        Push0 => op(2, 0, 1),
        Push1 | Push2 | Push3 | Push4 | Push5 | Push6 | Push7 | Push8 | Push9 | Push10
        | Push11 | Push12 | Push13 | Push14 | Push15 | Push16 | Push17 | Push18 | Push19
        | Push20 | Push21 | Push22 | Push23 | Push24 | Push25 | Push26 | Push27 | Push28
        | Push29 | Push30 | Push31 | Push32 => op(3, 0, 1),
        Dup1 | Dup2 | Dup3 | Dup4 | Dup5 | Dup6 | Dup7 | Dup8 | Dup9 | Dup10 | Dup11 | Dup12
        | Dup13 | Dup14 | Dup15 | Dup16 => op(3, opcode.dup_index() as u16, 1),
        Swap1 | Swap2 | Swap3 | Swap4 | Swap5 | Swap6 | Swap7 | Swap8 | Swap9 | Swap10
        | Swap11 | Swap12 | Swap13 | Swap14 | Swap15 | Swap16 => {
            op(3, opcode.swap_index() as u16 + 1, 0)
        }
        Log0 | Log1 | Log2 | Log3 | Log4 => {
            let topics = opcode.log_topics() as u16;
            op(375 * (topics as u64 + 1), topics + 2, -(topics as i16) - 2)
        }
        Create => op(32000, 3, -2),
        Call => op(call_base(revision), 7, -6),
        CallCode => op(call_base(revision), 7, -6),
        Return => op(0, 2, -2),
        DelegateCall => op(call_base(revision), 6, -5),
        Create2 => op(32000, 4, -3),
        StaticCall => op(call_base(revision), 6, -5),
        Revert => op(0, 2, -2),
        Invalid => op(0, 0, 0),
        SelfDestruct => op(selfdestruct_base(revision), 1, -1),
        Undefined => UNDEFINED,
    }
}

const fn stack_delta_for_mem(opcode: Opcode) -> i16 {
    match opcode {
        Opcode::MLoad => 0,
        _ => -2,
    }
}

const fn call_base(revision: Revision) -> u64 {
    if revision.has_access_lists() {
        0
    } else if revision.at_least(Revision::Tangerine) {
        700
    } else {
        40
    }
}

const fn selfdestruct_base(revision: Revision) -> u64 {
    if revision.at_least(Revision::Tangerine) {
        5000
    } else {
        0
    }
}

/// `10 + 50*byte_len(exp)` from Spurious Dragon onward, `10 + 10*byte_len(exp)` before.
pub fn exp_dynamic_cost(revision: Revision, exponent: U256) -> Option<u64> {
    let byte_len = exponent.byte_len() as u64;
    let per_byte = if revision.at_least(Revision::Spurious) {
        50
    } else {
        10
    };
    byte_len.checked_mul(per_byte)?.checked_add(10)
}

/// `30 + 6*words` for KECCAK256 and the `3*words`/`6*words` family added to COPY/CREATE2 costs.
pub fn word_count(size: u64) -> u64 {
    size.div_ceil(WORD_SIZE)
}

pub fn keccak256_dynamic_cost(size: u64) -> Option<u64> {
    word_count(size).checked_mul(6)
}

pub fn copy_dynamic_cost(size: u64) -> Option<u64> {
    word_count(size).checked_mul(3)
}

pub fn log_data_cost(size: u64) -> Option<u64> {
    size.checked_mul(8)
}

/// `3w + w^2/512`, the quadratic memory-expansion cost for `words` 32-byte words.
pub fn memory_cost_for_words(words: u64) -> Option<u64> {
    let linear = words.checked_mul(3)?;
    let quadratic = words.checked_mul(words)?.checked_div(MEMORY_EXPANSION_QUOTIENT)?;
    linear.checked_add(quadratic)
}

pub fn initcode_word_cost(revision: Revision, size: usize) -> u64 {
    if revision.has_initcode_cost() {
        word_count(size as u64).saturating_mul(2)
    } else {
        0
    }
}

pub const CODE_DEPOSIT_COST_PER_BYTE: u64 = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_opcode_has_zero_cost_and_zero_stack_shape() {
        let info = opcode_info(Revision::Cancun, Opcode::Undefined);
        assert_eq!(info, UNDEFINED);
    }

    #[test]
    fn add_is_verylow_tier_across_revisions() {
        assert_eq!(opcode_info(Revision::Frontier, Opcode::Add).base_cost, 3);
        assert_eq!(opcode_info(Revision::Cancun, Opcode::Add).base_cost, 3);
    }

    #[test]
    fn sload_cost_changes_by_revision() {
        assert_eq!(opcode_info(Revision::Frontier, Opcode::SLoad).base_cost, 50);
        assert_eq!(
            opcode_info(Revision::Tangerine, Opcode::SLoad).base_cost,
            200
        );
        assert_eq!(
            opcode_info(Revision::Istanbul, Opcode::SLoad).base_cost,
            800
        );
        assert_eq!(opcode_info(Revision::Berlin, Opcode::SLoad).base_cost, 0);
    }

    #[test]
    fn memory_cost_is_monotone_non_decreasing() {
        let mut prev = 0u64;
        for words in 0..2000u64 {
            let cost = memory_cost_for_words(words).expect("no overflow in range");
            assert!(cost >= prev);
            prev = cost;
        }
    }

    #[test]
    fn exp_cost_byte_len_scaling() {
        assert_eq!(
            exp_dynamic_cost(Revision::Cancun, U256::zero()),
            Some(10)
        );
        assert_eq!(
            exp_dynamic_cost(Revision::Cancun, U256::from(256u64)),
            Some(10 + 50 * 2)
        );
        assert_eq!(
            exp_dynamic_cost(Revision::Frontier, U256::from(256u64)),
            Some(10 + 10 * 2)
        );
    }

    #[test]
    fn log_cost_scales_with_topics_and_data() {
        let info = opcode_info(Revision::Cancun, Opcode::Log2);
        assert_eq!(info.base_cost, 375 * 3);
        assert_eq!(log_data_cost(10), Some(80));
    }
}
