//! Driver contract: subsystems that offer services on top of channels.

use alloc::sync::Arc;

use crate::device::KcsBmcDevice;
use crate::error::KcsError;

/// A higher-level subsystem that wants to know about every KCS channel
/// (for example a character-device front end that creates one node per
/// channel).
///
/// Calls are notifications: the driver does not own the device and the
/// registry does not undo other drivers' work when one of them fails.
/// Callbacks run with the registry lock held, so they may block but must
/// not call back into the registry.
pub trait KcsBmcDriver: Send + Sync {
    /// Short name used in log messages (e.g. "ipmi-kcs").
    fn name(&self) -> &str;

    /// A channel became available.
    ///
    /// # Errors
    ///
    /// Returns the reason the driver could not set itself up on `device`.
    fn add_device(&self, device: &Arc<KcsBmcDevice>) -> Result<(), KcsError>;

    /// A channel is going away, or this driver is being unregistered.
    ///
    /// May be called for a device whose `add_device` failed; drivers must
    /// tolerate that.
    ///
    /// # Errors
    ///
    /// Returns the reason the driver could not tear itself down.
    fn remove_device(&self, device: &Arc<KcsBmcDevice>) -> Result<(), KcsError>;
}
