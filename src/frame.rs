//! A call frame: the execution state of one CALL/CREATE invocation (§3
//! "Execution state", §4.7).

use crate::address::Address;
use crate::analysis::Analysis;
use crate::memory::Memory;
use crate::result::StatusCode;
use crate::revision::Revision;
use crate::stack::Stack;
use crate::u256::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Create2,
}

impl CallKind {
    pub fn is_create(self) -> bool {
        matches!(self, CallKind::Create | CallKind::Create2)
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub kind: CallKind,
    pub depth: u32,
    pub is_static: bool,
    pub gas: i64,
    pub recipient: Address,
    pub sender: Address,
    pub input_data: Vec<u8>,
    pub value: U256,
    pub code_address: Address,
    pub create2_salt: U256,
}

pub const MAX_CALL_DEPTH: u32 = 1024;

/// The mutable state threaded through a single frame's dispatch loop.
pub struct ExecutionState<'a> {
    pub gas_left: i64,
    /// Accumulated SSTORE/SELFDESTRUCT refund (§4.2), capped against the gas
    /// actually used when the frame finishes.
    pub gas_refund: i64,
    pub stack: Stack,
    pub memory: Memory,
    pub return_data: Vec<u8>,
    pub status: Option<StatusCode>,
    pub output: Vec<u8>,
    pub analysis: &'a Analysis,
    /// Gas already prepaid for the block currently executing; used only to
    /// answer GAS's "instruction-granular remaining gas" question (§9 open
    /// question 2), never consulted by ordinary handlers.
    pub current_block_cost: u64,
    /// Sum of the base costs of every instruction in the current block that
    /// has executed so far, including the one currently running. The
    /// dispatch loop is the sole writer, incrementing this just before each
    /// instruction's handler runs.
    pub block_cost_consumed: u64,
    pub message: Message,
    pub revision: Revision,
    /// Instruction-stream index of the instruction currently executing; the
    /// dispatch loop advances this, handlers only read it (PC, JUMP/JUMPI).
    pub pc: usize,
}

impl<'a> ExecutionState<'a> {
    pub fn new(message: Message, analysis: &'a Analysis, revision: Revision) -> Self {
        let gas_left = message.gas;
        Self {
            gas_left,
            gas_refund: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            status: None,
            output: Vec::new(),
            analysis,
            current_block_cost: 0,
            block_cost_consumed: 0,
            message,
            revision,
            pc: 0,
        }
    }

    /// Gas remaining as of the current instruction, reconstructing the
    /// within-block progress that block-level prepayment would otherwise hide:
    /// the block's full cost was already deducted from `gas_left` at block
    /// entry, so the portion of that prepayment not yet "spent" by an
    /// instruction that has actually run gets added back.
    pub fn instruction_granular_gas_left(&self) -> i64 {
        let unconsumed = self.current_block_cost.saturating_sub(self.block_cost_consumed);
        let unconsumed: i64 = unconsumed.try_into().unwrap_or(i64::MAX);
        self.gas_left.saturating_add(unconsumed)
    }
}
