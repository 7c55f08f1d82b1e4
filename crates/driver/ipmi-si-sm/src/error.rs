//! Engine and transaction error types.

use core::fmt;

/// Why [`SiStateMachine::start_transaction`](crate::SiStateMachine::start_transaction)
/// refused a request. No transaction is started in either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// The engine is not idle.
    Busy,
    /// The request is shorter or longer than the engine accepts.
    InvalidSize,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("state machine busy"),
            Self::InvalidSize => f.write_str("invalid request size"),
        }
    }
}

impl core::error::Error for StartError {}

/// Why [`SiStateMachine::get_result`](crate::SiStateMachine::get_result)
/// returned no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultError {
    /// The caller's buffer cannot hold the response. Nothing was copied and
    /// the response is still available.
    BufferTooSmall,
    /// No transaction has completed.
    NoResult,
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("result buffer too small"),
            Self::NoResult => f.write_str("no result available"),
        }
    }
}

impl core::error::Error for ResultError {}

/// Presence-probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectError {
    /// Nothing answering at the configured address.
    NotPresent,
    /// The probe itself failed.
    Io,
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => f.write_str("interface not present"),
            Self::Io => f.write_str("I/O error during detection"),
        }
    }
}

impl core::error::Error for DetectError {}

/// Failure of a transaction driven by [`run_transaction`](crate::run_transaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionError {
    /// The engine refused the request.
    Start(StartError),
    /// The engine completed but the response could not be fetched.
    Result(ResultError),
    /// The hardware violated the protocol.
    Hosed,
    /// The step budget ran out before the transaction completed.
    Timeout,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(e) => write!(f, "failed to start transaction: {e}"),
            Self::Result(e) => write!(f, "failed to fetch result: {e}"),
            Self::Hosed => f.write_str("interface hosed"),
            Self::Timeout => f.write_str("transaction timed out"),
        }
    }
}

impl core::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Start(e) => Some(e),
            Self::Result(e) => Some(e),
            Self::Hosed | Self::Timeout => None,
        }
    }
}

impl From<StartError> for TransactionError {
    fn from(e: StartError) -> Self {
        Self::Start(e)
    }
}

impl From<ResultError> for TransactionError {
    fn from(e: ResultError) -> Self {
        Self::Result(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    #[test]
    fn transaction_error_wraps_cause() {
        let e = TransactionError::from(StartError::InvalidSize);
        assert_eq!(e, TransactionError::Start(StartError::InvalidSize));
        assert_eq!(
            format!("{e}"),
            "failed to start transaction: invalid request size"
        );
        assert!(e.source().is_some());
        assert!(TransactionError::Timeout.source().is_none());
    }

    #[test]
    fn display_leaf_errors() {
        assert_eq!(format!("{}", StartError::Busy), "state machine busy");
        assert_eq!(
            format!("{}", ResultError::BufferTooSmall),
            "result buffer too small"
        );
        assert_eq!(format!("{}", DetectError::NotPresent), "interface not present");
    }
}
