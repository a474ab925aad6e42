//! The code analyzer (§4.3): one linear pass over raw bytecode producing a
//! pre-decoded instruction stream with synthetic block-begin markers carrying
//! aggregated per-basic-block gas and stack requirements.
//!
//! Doing the gas/stack accounting once per block instead of once per
//! instruction is the engine's main speed lever (§4.3 "why this shape");
//! everything else in this module exists to make that one fact true.

use crate::gas::opcode_info;
use crate::opcode::Opcode;
use crate::revision::Revision;
use crate::u256::U256;

/// Aggregated requirements of one basic block, checked once on block entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockInfo {
    pub base_gas_cost: u64,
    pub stack_required: i32,
    pub stack_max_growth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionArg {
    None,
    /// PUSH1..PUSH8 immediates, inlined (fits a 64-bit word).
    SmallPush(u64),
    /// PUSH9..PUSH32 immediates, stored in the analysis's constant pool.
    PushPoolIndex(usize),
    Block(BlockInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub arg: InstructionArg,
    /// Source bytecode offset PC should report when this instruction is current.
    pub byte_offset: usize,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub instructions: Vec<Instruction>,
    pub push_pool: Vec<U256>,
    /// (source byte offset, instruction-stream index of the matching block-begin),
    /// sorted by byte offset.
    jumpdest_table: Vec<(usize, usize)>,
}

impl Analysis {
    pub fn analyze(code: &[u8], revision: Revision) -> Analysis {
        let mut instructions = Vec::new();
        let mut push_pool = Vec::new();
        let mut jumpdest_table = Vec::new();

        instructions.push(block_begin_placeholder(0));
        let mut block = OpenBlock::default();

        let mut pc = 0usize;
        let mut pending_new_block = false;

        while pc < code.len() {
            if pending_new_block {
                instructions.push(block_begin_placeholder(pc));
                block = OpenBlock::with_index(instructions.len() - 1, pc);
                pending_new_block = false;
            }

            let byte = code[pc];
            let opcode = Opcode::from_byte(byte);

            if opcode == Opcode::JumpDest {
                // A JUMPDEST always opens a new block, whether or not it
                // immediately follows a terminator (§4.3 rule 1/4) -- a jump
                // must land on a block-begin that starts fresh at the
                // JUMPDEST, never partway through an earlier block.
                if block.start_pc != pc {
                    write_block_info(&mut instructions, block.index, block.finish());
                    instructions.push(block_begin_placeholder(pc));
                    block = OpenBlock::with_index(instructions.len() - 1, pc);
                }
                jumpdest_table.push((pc, block.index));
                let info = opcode_info(revision, opcode);
                block.charge(info.base_cost, info.stack_in as i32, info.stack_delta as i32);
                pc += 1;
                continue;
            }

            if opcode.is_push() {
                let size = opcode.push_size() as usize;
                let start = pc + 1;
                let end = (start + size).min(code.len());
                let mut bytes = [0u8; 32];
                let available = &code[start.min(code.len())..end];
                bytes[32 - size..32 - size + available.len()].copy_from_slice(available);

                let arg = if size <= 8 {
                    let mut word = [0u8; 8];
                    word.copy_from_slice(&bytes[24..32]);
                    InstructionArg::SmallPush(u64::from_be_bytes(word))
                } else {
                    let index = push_pool.len();
                    push_pool.push(U256::from_be_bytes(&bytes));
                    InstructionArg::PushPoolIndex(index)
                };

                let info = opcode_info(revision, opcode);
                block.charge(info.base_cost, info.stack_in as i32, info.stack_delta as i32);
                instructions.push(Instruction {
                    opcode,
                    arg,
                    byte_offset: pc,
                });
                pc += 1 + size;
                continue;
            }

            let info = opcode_info(revision, opcode);
            block.charge(info.base_cost, info.stack_in as i32, info.stack_delta as i32);
            instructions.push(Instruction {
                opcode,
                arg: InstructionArg::None,
                byte_offset: pc,
            });
            pc += 1;

            if opcode.is_block_terminator() {
                write_block_info(&mut instructions, block.index, block.finish());
                pending_new_block = true;
            }
        }

        if !pending_new_block {
            instructions.push(Instruction {
                opcode: Opcode::Stop,
                arg: InstructionArg::None,
                byte_offset: pc,
            });
            write_block_info(&mut instructions, block.index, block.finish());
        }

        Analysis {
            instructions,
            push_pool,
            jumpdest_table,
        }
    }

    /// Resolves a JUMP/JUMPI target byte offset to an instruction-stream index,
    /// or `None` if `offset` is not a valid JUMPDEST (§4.5 "bad jump destination").
    pub fn resolve_jump(&self, byte_offset: u64) -> Option<usize> {
        let offset: usize = byte_offset.try_into().ok()?;
        self.jumpdest_table
            .binary_search_by_key(&offset, |&(o, _)| o)
            .ok()
            .map(|i| self.jumpdest_table[i].1)
    }

    pub fn block_info(&self, index: usize) -> Option<BlockInfo> {
        match self.instructions.get(index)?.arg {
            InstructionArg::Block(info) => Some(info),
            _ => None,
        }
    }

    /// The source bytecode offset PC should report while `index` is current.
    pub fn byte_offset(&self, index: usize) -> u64 {
        self.instructions
            .get(index)
            .map_or(0, |instruction| instruction.byte_offset as u64)
    }
}

#[derive(Default)]
struct OpenBlock {
    index: usize,
    /// Byte offset this block's block-begin instruction was created for, used
    /// to tell "already fresh for this pc" apart from "opened earlier".
    start_pc: usize,
    gas: u64,
    height: i32,
    stack_required: i32,
    stack_max_growth: i32,
}

impl OpenBlock {
    fn with_index(index: usize, start_pc: usize) -> Self {
        Self {
            index,
            start_pc,
            ..Self::default()
        }
    }

    fn charge(&mut self, base_cost: u64, stack_in: i32, stack_delta: i32) {
        self.gas = self.gas.saturating_add(base_cost);
        let deficit = (-self.height).max(0);
        self.stack_required = self.stack_required.max(deficit + stack_in);
        self.stack_max_growth = self
            .stack_max_growth
            .max(self.height + stack_delta.max(0));
        self.height += stack_delta;
    }

    fn finish(&self) -> BlockInfo {
        BlockInfo {
            base_gas_cost: self.gas,
            stack_required: self.stack_required,
            stack_max_growth: self.stack_max_growth,
        }
    }
}

fn block_begin_placeholder(byte_offset: usize) -> Instruction {
    Instruction {
        opcode: Opcode::JumpDest,
        arg: InstructionArg::Block(BlockInfo::default()),
        byte_offset,
    }
}

fn write_block_info(instructions: &mut [Instruction], index: usize, info: BlockInfo) {
    if let Some(instruction) = instructions.get_mut(index) {
        instruction.arg = InstructionArg::Block(info);
    }
}
