//! Outcome of one engine step.

/// What an engine wants after [`SiStateMachine::event`](crate::SiStateMachine::event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmResult {
    /// Call again immediately.
    CallWithoutDelay,
    /// Call again after a short delay.
    CallWithDelay,
    /// Call again after at least one timer tick.
    CallWithTickDelay,
    /// A transaction finished; fetch it with `get_result`.
    TransactionComplete,
    /// Nothing in progress.
    Idle,
    /// The hardware violated the protocol; the transaction is lost.
    Hosed,
    /// The engine is idle and the BMC is asserting attention.
    Attn,
}

impl SmResult {
    /// Returns `true` if the engine expects to be called again to make
    /// progress on the current transaction.
    #[must_use]
    pub const fn wants_poll(self) -> bool {
        matches!(
            self,
            Self::CallWithoutDelay | Self::CallWithDelay | Self::CallWithTickDelay
        )
    }
}
