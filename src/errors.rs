//! Two error taxonomies, kept deliberately separate (§4.7, §10):
//!
//! [`ExecutionError`] is consensus-visible: every variant corresponds to one of
//! the `Failed` sub-states a conforming implementation must also produce, so
//! matching on it is part of this crate's observable behavior.
//!
//! [`InternalError`] can only be produced by a bug in this crate (an analysis
//! invariant violated, an index out of range that the analyzer should have
//! ruled out) and is never part of the consensus-visible result.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("out of gas")]
    OutOfGas,
    #[error("bad jump destination")]
    BadJumpDest,
    #[error("static context violation")]
    StaticViolation,
    #[error("invalid instruction")]
    InvalidInstruction,
    #[error("out of memory")]
    OutOfMemory,
    #[error("call depth exceeded")]
    CallDepth,
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("analysis invariant violated: {0}")]
    AnalysisInvariant(&'static str),
    #[error("instruction pointer {0} out of bounds for analyzed code of length {1}")]
    InstructionPointerOutOfBounds(usize, usize),
    #[error("host returned data inconsistent with its own contract: {0}")]
    HostContractViolation(&'static str),
}
