//! The dispatch loop (§4.4): walks the pre-decoded instruction stream one
//! entry at a time, realizing block-begin markers as the once-per-block gas
//! and stack check and everything else as a call into the matching handler.

use crate::analysis::InstructionArg;
use crate::errors::ExecutionError;
use crate::frame::ExecutionState;
use crate::gas::{opcode_info, STACK_LIMIT};
use crate::host::Host;
use crate::opcode::Opcode;
use crate::opcode_handlers::{
    arithmetic, bitwise_comparison, block, dup, environment, exchange, keccak, logging, push,
    stack_memory_storage_flow as flow, system,
};
use crate::result::{ExecutionResult, StatusCode};

/// Runs `state` to completion against `code`/`host`, returning the final result.
/// Never panics: any condition the analyzer's invariants should have ruled out
/// (an instruction index past the end of the stream) surfaces as `OutOfGas`-free
/// failure via [`ExecutionError::InvalidInstruction`] rather than a crash, since
/// consensus code must not panic on attacker-supplied bytecode.
pub fn run(state: &mut ExecutionState<'_>, code: &[u8], host: &mut dyn Host) -> ExecutionResult {
    loop {
        match step(state, code, host) {
            Ok(()) => {
                if let Some(status) = state.status {
                    return finish(state, status);
                }
            }
            Err(error) => return finish(state, StatusCode::Failed(error)),
        }
    }
}

fn step(state: &mut ExecutionState<'_>, code: &[u8], host: &mut dyn Host) -> Result<(), ExecutionError> {
    let instruction = *state
        .analysis
        .instructions
        .get(state.pc)
        .ok_or(ExecutionError::InvalidInstruction)?;

    if let InstructionArg::Block(info) = instruction.arg {
        enter_block(state, info)?;
        state.pc += 1;
        return Ok(());
    }

    let opcode = instruction.opcode;
    let mut next_pc = state.pc + 1;

    state.block_cost_consumed = state
        .block_cost_consumed
        .saturating_add(opcode_info(state.revision, opcode).base_cost);

    use Opcode::*;
    match opcode {
        Stop => state.status = Some(StatusCode::Success),

        Add => arithmetic::add(state)?,
        Sub => arithmetic::sub(state)?,
        Mul => arithmetic::mul(state)?,
        Div => arithmetic::div(state)?,
        SDiv => arithmetic::sdiv(state)?,
        Mod => arithmetic::modulo(state)?,
        SMod => arithmetic::smod(state)?,
        AddMod => arithmetic::addmod(state)?,
        MulMod => arithmetic::mulmod(state)?,
        Exp => arithmetic::exp(state)?,
        SignExtend => arithmetic::signextend(state)?,

        Lt => bitwise_comparison::lt(state)?,
        Gt => bitwise_comparison::gt(state)?,
        SLt => bitwise_comparison::slt(state)?,
        SGt => bitwise_comparison::sgt(state)?,
        Eq => bitwise_comparison::eq(state)?,
        IsZero => bitwise_comparison::iszero(state)?,
        And => bitwise_comparison::and(state)?,
        Or => bitwise_comparison::or(state)?,
        Xor => bitwise_comparison::xor(state)?,
        Not => bitwise_comparison::not(state)?,
        Byte => bitwise_comparison::byte(state)?,
        Shl => bitwise_comparison::shl(state)?,
        Shr => bitwise_comparison::shr(state)?,
        Sar => bitwise_comparison::sar(state)?,

        Keccak256 => keccak::keccak256(state)?,

        Address => environment::address(state)?,
        Balance => environment::balance(state, host)?,
        Origin => environment::origin(state, host)?,
        Caller => environment::caller(state)?,
        CallValue => environment::callvalue(state)?,
        CallDataLoad => environment::calldataload(state)?,
        CallDataSize => environment::calldatasize(state)?,
        CallDataCopy => environment::calldatacopy(state)?,
        CodeSize => environment::codesize(state, code)?,
        CodeCopy => environment::codecopy(state, code)?,
        GasPrice => environment::gasprice(state, host)?,
        ExtCodeSize => environment::extcodesize(state, host)?,
        ExtCodeCopy => environment::extcodecopy(state, host)?,
        ReturnDataSize => environment::returndatasize(state)?,
        ReturnDataCopy => environment::returndatacopy(state)?,
        ExtCodeHash => environment::extcodehash(state, host)?,
        SelfBalance => environment::selfbalance(state, host)?,
        BlobHash => environment::blobhash(state, host)?,

        BlockHash => block::blockhash(state, host)?,
        Coinbase => block::coinbase(state, host)?,
        Timestamp => block::timestamp(state, host)?,
        Number => block::number(state, host)?,
        PrevRandao => block::prevrandao(state, host)?,
        GasLimit => block::gaslimit(state, host)?,
        ChainId => block::chainid(state, host)?,
        BaseFee => block::basefee(state, host)?,
        BlobBaseFee => block::blobbasefee(state, host)?,

        Pop => flow::pop(state)?,
        MLoad => flow::mload(state)?,
        MStore => flow::mstore(state)?,
        MStore8 => flow::mstore8(state)?,
        SLoad => flow::sload(state, host)?,
        SStore => flow::sstore(state, host)?,
        Jump => next_pc = flow::jump(state)?,
        Jumpi => {
            if let Some(target) = flow::jumpi(state)? {
                next_pc = target;
            }
        }
        Pc => flow::pc(state)?,
        MSize => flow::msize(state)?,
        Gas => flow::gas(state)?,
        JumpDest => flow::jumpdest(state)?,
        TLoad => flow::tload(state, host)?,
        TStore => flow::tstore(state, host)?,
        MCopy => flow::mcopy(state)?,

        Push0 | Push1 | Push2 | Push3 | Push4 | Push5 | Push6 | Push7 | Push8 | Push9
        | Push10 | Push11 | Push12 | Push13 | Push14 | Push15 | Push16 | Push17 | Push18
        | Push19 | Push20 | Push21 | Push22 | Push23 | Push24 | Push25 | Push26 | Push27
        | Push28 | Push29 | Push30 | Push31 | Push32 => push::push(state, instruction.arg)?,

        Dup1 | Dup2 | Dup3 | Dup4 | Dup5 | Dup6 | Dup7 | Dup8 | Dup9 | Dup10 | Dup11 | Dup12
        | Dup13 | Dup14 | Dup15 | Dup16 => dup::dup(state, opcode.dup_index() as usize)?,

        Swap1 | Swap2 | Swap3 | Swap4 | Swap5 | Swap6 | Swap7 | Swap8 | Swap9 | Swap10
        | Swap11 | Swap12 | Swap13 | Swap14 | Swap15 | Swap16 => {
            exchange::swap(state, opcode.swap_index() as usize)?
        }

        Log0 | Log1 | Log2 | Log3 | Log4 => logging::log(state, host, opcode.log_topics() as usize)?,

        Create => system::create(state, host)?,
        Call => system::call(state, host)?,
        CallCode => system::callcode(state, host)?,
        Return => system::do_return(state)?,
        DelegateCall => system::delegatecall(state, host)?,
        Create2 => system::create2(state, host)?,
        StaticCall => system::staticcall(state, host)?,
        Revert => system::revert(state)?,
        Invalid => system::invalid(state)?,
        SelfDestruct => system::selfdestruct(state, host)?,

        Undefined => return Err(ExecutionError::InvalidInstruction),
    }

    state.pc = next_pc;
    Ok(())
}

/// The once-per-block check (§4.3 rule 2, §4.4): deduct the block's prepaid gas
/// and verify its precomputed stack bounds before any instruction in it runs.
fn enter_block(state: &mut ExecutionState<'_>, info: crate::analysis::BlockInfo) -> Result<(), ExecutionError> {
    let cost: i64 = info.base_gas_cost.try_into().unwrap_or(i64::MAX);
    if state.gas_left < cost {
        state.gas_left = 0;
        return Err(ExecutionError::OutOfGas);
    }
    let stack_len = i32::try_from(state.stack.len()).unwrap_or(i32::MAX);
    if stack_len < info.stack_required {
        return Err(ExecutionError::StackUnderflow);
    }
    let limit = i32::try_from(STACK_LIMIT).unwrap_or(i32::MAX);
    if stack_len.saturating_add(info.stack_max_growth) > limit {
        return Err(ExecutionError::StackOverflow);
    }
    state.gas_left -= cost;
    state.current_block_cost = info.base_gas_cost;
    state.block_cost_consumed = 0;
    Ok(())
}

fn finish(state: &ExecutionState<'_>, status: StatusCode) -> ExecutionResult {
    let gas_left = if status.preserves_gas() {
        u64::try_from(state.gas_left.max(0)).unwrap_or(0)
    } else {
        0
    };
    let gas_refund = if status.is_success() {
        u64::try_from(state.gas_refund.max(0)).unwrap_or(0)
    } else {
        0
    };
    ExecutionResult {
        status,
        gas_left,
        gas_refund,
        output: state.output.clone(),
        create_address: None,
    }
}
