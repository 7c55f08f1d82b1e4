//! Synchronous transaction driver.

use log::{debug, trace};

use crate::error::TransactionError;
use crate::handlers::SiStateMachine;
use crate::result::SmResult;

/// Time source used by [`run_transaction`] to honour engine delays.
///
/// Both methods wait and return the microseconds that actually elapsed,
/// which are fed back to the engine on its next step.
pub trait SmTimer {
    /// Waits a short interval (the engine asked for
    /// [`SmResult::CallWithDelay`]).
    fn short_delay(&mut self) -> u64;

    /// Waits at least one timer tick.
    fn tick(&mut self) -> u64;
}

/// Drives `sm` through one request/response exchange.
///
/// Starts `request`, steps the engine until it reports completion, and
/// copies the response into `response`. At most `max_steps` calls to
/// [`SiStateMachine::event`] are made.
///
/// # Errors
///
/// - [`TransactionError::Start`] if the engine refused the request.
/// - [`TransactionError::Hosed`] if the engine reported a protocol violation.
/// - [`TransactionError::Timeout`] if `max_steps` ran out.
/// - [`TransactionError::Result`] if the response did not fit `response`.
pub fn run_transaction(
    sm: &mut dyn SiStateMachine,
    request: &[u8],
    response: &mut [u8],
    timer: &mut dyn SmTimer,
    max_steps: usize,
) -> Result<usize, TransactionError> {
    sm.start_transaction(request)?;

    let mut elapsed = 0;
    for step in 0..max_steps {
        let result = sm.event(elapsed);
        trace!("{}: step {} after {}us -> {:?}", sm.version(), step, elapsed, result);

        elapsed = match result {
            SmResult::CallWithoutDelay => 0,
            SmResult::CallWithDelay => timer.short_delay(),
            // Idle/Attn mid-transaction: the engine is waiting on the BMC.
            SmResult::CallWithTickDelay | SmResult::Idle | SmResult::Attn => timer.tick(),
            SmResult::TransactionComplete => {
                let len = sm.get_result(response)?;
                trace!("{}: {} byte response", sm.version(), len);
                return Ok(len);
            }
            SmResult::Hosed => {
                debug!("{}: interface hosed at step {}", sm.version(), step);
                return Err(TransactionError::Hosed);
            }
        };
    }

    debug!("{}: no completion after {} steps", sm.version(), max_steps);
    Err(TransactionError::Timeout)
}
