//! Client contract: the protocol owner of a channel.

use crate::device::KcsBmcDevice;
use crate::event::IrqReturn;

/// A protocol-policy component that can own a KCS channel.
///
/// A client binds to a channel with [`KcsBmcDevice::enable`] and releases it
/// with [`KcsBmcDevice::disable`]. The device only keeps a weak reference to
/// its client: the client's lifetime belongs to the subsystem that created
/// it, which must call `disable` before dropping it.
///
/// Dispatch holds a strong reference for the duration of
/// [`event`](Self::event). If the owning subsystem drops its last handle
/// meanwhile, the client is dropped by the interrupt path with the dispatch
/// lock held, so a client's `Drop` must be safe in interrupt context and
/// must not touch the device it was bound to.
pub trait KcsBmcClient: Send + Sync {
    /// Handles a channel interrupt.
    ///
    /// Runs in interrupt context with the channel's dispatch lock held:
    /// it may use the device's data/status accessors and
    /// [`KcsBmcDevice::update_event_mask`], but must not call
    /// [`KcsBmcDevice::enable`], [`KcsBmcDevice::disable`],
    /// [`KcsBmcDevice::is_bound`] or [`KcsBmcDevice::is_bound_to`] on
    /// `device` (each takes the dispatch lock and would deadlock) and must
    /// not sleep.
    fn event(&self, device: &KcsBmcDevice) -> IrqReturn;
}
