//! The outcome of running one call frame to completion (§3 "Result", §7).

use crate::errors::ExecutionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    Revert,
    Failed(ExecutionError),
}

impl StatusCode {
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Success)
    }

    /// A revert preserves remaining gas and returns caller-supplied data, unlike
    /// a genuine failure, which always burns whatever gas remained (§3 "Result").
    pub fn preserves_gas(self) -> bool {
        matches!(self, StatusCode::Success | StatusCode::Revert)
    }
}

impl From<ExecutionError> for StatusCode {
    fn from(error: ExecutionError) -> Self {
        StatusCode::Failed(error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: StatusCode,
    pub gas_left: u64,
    pub gas_refund: u64,
    pub output: Vec<u8>,
    /// Set only by a successful CREATE/CREATE2 frame.
    pub create_address: Option<[u8; 20]>,
}

impl ExecutionResult {
    pub fn success(gas_left: u64, gas_refund: u64, output: Vec<u8>) -> Self {
        Self {
            status: StatusCode::Success,
            gas_left,
            gas_refund,
            output,
            create_address: None,
        }
    }

    pub fn revert(gas_left: u64, output: Vec<u8>) -> Self {
        Self {
            status: StatusCode::Revert,
            gas_left,
            gas_refund: 0,
            output,
            create_address: None,
        }
    }

    pub fn failed(error: ExecutionError) -> Self {
        Self {
            status: StatusCode::Failed(error),
            gas_left: 0,
            gas_refund: 0,
            output: Vec::new(),
            create_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_burns_all_gas() {
        let result = ExecutionResult::failed(ExecutionError::OutOfGas);
        assert_eq!(result.gas_left, 0);
        assert!(!result.status.preserves_gas());
    }

    #[test]
    fn revert_preserves_gas_and_output() {
        let result = ExecutionResult::revert(100, vec![1, 2, 3]);
        assert!(result.status.preserves_gas());
        assert_eq!(result.gas_left, 100);
        assert_eq!(result.output, vec![1, 2, 3]);
    }
}
