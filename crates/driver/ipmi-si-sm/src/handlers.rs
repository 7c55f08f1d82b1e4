//! The engine trait and its static descriptor.

use alloc::boxed::Box;

use crate::error::{DetectError, ResultError, StartError};
use crate::io::SiSmIo;
use crate::result::SmResult;

/// A low-level transport engine for one system interface.
///
/// Engines never block. All waiting is expressed through the [`SmResult`]
/// returned by [`event`](Self::event), and the caller decides how to wait.
pub trait SiStateMachine: Send {
    /// Human-readable engine version, for diagnostics.
    fn version(&self) -> &'static str;

    /// Takes ownership of the I/O configuration and resets private state.
    ///
    /// Returns the number of bytes of I/O space the caller should reserve.
    fn init_data(&mut self, io: SiSmIo) -> u64;

    /// Begins sending `request` to the BMC.
    ///
    /// # Errors
    ///
    /// [`StartError::Busy`] if a transaction is in progress or its result
    /// has not been collected; [`StartError::InvalidSize`] if `request` is
    /// empty or too long. Nothing is started on error.
    fn start_transaction(&mut self, request: &[u8]) -> Result<(), StartError>;

    /// Advances the engine by one step.
    ///
    /// `elapsed_us` is the time since the previous call, or 0 if unknown.
    /// Call this from the interface interrupt or from a poll loop.
    fn event(&mut self, elapsed_us: u64) -> SmResult;

    /// Copies the completed response into `buf` and returns its length.
    ///
    /// A successful call consumes the result and returns the engine to idle.
    ///
    /// # Errors
    ///
    /// [`ResultError::BufferTooSmall`] if `buf` is shorter than the
    /// response (nothing copied, result retained);
    /// [`ResultError::NoResult`] if no transaction has completed.
    fn get_result(&mut self, buf: &mut [u8]) -> Result<usize, ResultError>;

    /// Probes for the interface.
    ///
    /// # Errors
    ///
    /// Returns why the interface could not be found.
    fn detect(&mut self) -> Result<(), DetectError>;

    /// Releases whatever `init_data` acquired. The engine must be
    /// re-initialized before further use.
    fn cleanup(&mut self);
}

/// Static description of an engine type.
///
/// Engines export one of these as a `static` so the upper layer can pick an
/// engine by interface type, report its version, and account for its
/// storage before creating it.
pub struct SmDescriptor {
    /// Engine version, same as [`SiStateMachine::version`].
    pub version: &'static str,
    /// Size in bytes of the engine's private state.
    pub size: fn() -> usize,
    /// Creates an uninitialized engine.
    pub create: fn() -> Box<dyn SiStateMachine>,
}

impl SmDescriptor {
    /// Creates an engine and initializes it with `io`.
    ///
    /// Returns the engine and the I/O space it asked to reserve.
    pub fn instantiate(&self, io: SiSmIo) -> (Box<dyn SiStateMachine>, u64) {
        let mut sm = (self.create)();
        let reserve = sm.init_data(io);
        (sm, reserve)
    }
}

impl core::fmt::Debug for SmDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmDescriptor")
            .field("version", &self.version)
            .field("size", &(self.size)())
            .finish_non_exhaustive()
    }
}
