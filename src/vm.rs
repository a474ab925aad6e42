//! Top-level entry point (§3 "Execute", §4.1): ties analysis, a fresh call
//! frame, and the dispatch loop together into one `execute` call, and caches
//! analyses across calls so a hot contract is decoded once, not once per call.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use sha3::{Digest, Keccak256};

use crate::analysis::Analysis;
use crate::dispatch;
use crate::frame::{ExecutionState, Message};
use crate::gas::{GAS_REFUND_DENOMINATOR, GAS_REFUND_DENOMINATOR_PRE_LONDON};
use crate::host::Host;
use crate::result::{ExecutionResult, StatusCode};
use crate::revision::Revision;

/// Analyses are keyed on `(revision, keccak256(code))` (§4.3 "analysis is pure
/// in the code and revision"): the same bytecode analyzed under the same
/// revision always produces the same instruction stream, so repeat callers
/// (most commonly a contract invoked many times in one block) skip re-analysis.
fn analysis_cache() -> &'static Mutex<HashMap<(Revision, [u8; 32]), Analysis>> {
    static CACHE: OnceLock<Mutex<HashMap<(Revision, [u8; 32]), Analysis>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn code_hash(code: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(code);
    digest.as_slice().try_into().unwrap_or([0; 32])
}

/// Runs `message` against `code` under `revision`, reporting to `host` for
/// every piece of state outside this one frame. Never recurses: CALL/CREATE
/// family opcodes re-enter through [`Host::call`] instead (§6).
pub fn execute(message: Message, code: &[u8], revision: Revision, host: &mut dyn Host) -> ExecutionResult {
    if message.depth > crate::frame::MAX_CALL_DEPTH {
        return ExecutionResult::failed(crate::errors::ExecutionError::CallDepth);
    }

    let key = (revision, code_hash(code));
    let cache = analysis_cache();
    {
        let guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(analysis) = guard.get(&key) {
            tracing::trace!("analysis cache hit at depth {}", message.depth);
            return run_with_analysis(message, analysis, code, revision, host);
        }
    }

    tracing::debug!("analyzing {} bytes of code under {:?}", code.len(), revision);
    let analysis = Analysis::analyze(code, revision);
    let result = run_with_analysis(message, &analysis, code, revision, host);
    let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.entry(key).or_insert(analysis);
    result
}

fn run_with_analysis(
    message: Message,
    analysis: &Analysis,
    code: &[u8],
    revision: Revision,
    host: &mut dyn Host,
) -> ExecutionResult {
    let gas_limit = message.gas;
    let mut state = ExecutionState::new(message, analysis, revision);
    let mut result = dispatch::run(&mut state, code, host);
    if result.status.is_success() {
        result.gas_refund = cap_refund(gas_limit, result.gas_left, revision, result.gas_refund);
    }
    tracing::debug!(
        "frame finished: status={:?} gas_left={} gas_refund={}",
        result.status,
        result.gas_left,
        result.gas_refund
    );
    result
}

/// The refund actually granted is capped at a fraction of gas consumed
/// (EIP-3529 tightened this from 1/2 to 1/5, §4.2).
fn cap_refund(gas_limit: i64, gas_left: u64, revision: Revision, refund: u64) -> u64 {
    let used = gas_limit.max(0).unsigned_abs().saturating_sub(gas_left);
    let denominator = if revision.has_reduced_refunds() {
        GAS_REFUND_DENOMINATOR
    } else {
        GAS_REFUND_DENOMINATOR_PRE_LONDON
    };
    refund.min(used / denominator)
}
