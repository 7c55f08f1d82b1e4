//! KCS channel devices: register access, client binding and dispatch.

use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};

use kcs_core::id::ChannelId;
use kcs_core::sync::IrqSpinLock;
use log::{debug, warn};

use crate::client::KcsBmcClient;
use crate::error::KcsError;
use crate::event::{EventMask, IrqReturn};

/// Register offsets of one KCS channel.
///
/// Offsets are relative to whatever base the backend's
/// [`KcsBmcDeviceOps`] resolves them against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KcsIoReg {
    /// Input data register (host → BMC).
    pub idr: u32,
    /// Output data register (BMC → host).
    pub odr: u32,
    /// Status register.
    pub str: u32,
}

/// I/O capability table implemented by a hardware backend.
///
/// Methods take `&self` because the registers are shared hardware state.
/// All of them may be called from interrupt context and must not sleep.
pub trait KcsBmcDeviceOps: Send + Sync {
    /// Updates the interrupt enables: bits set in `mask` take their value
    /// from `events`, other bits are left alone.
    fn irq_mask_update(&self, mask: EventMask, events: EventMask);

    /// Reads the byte register at `reg`.
    fn io_inputb(&self, reg: u32) -> u8;

    /// Writes `data` to the byte register at `reg`.
    fn io_outputb(&self, reg: u32, data: u8);

    /// Read-modify-write: bits set in `mask` take their value from `data`.
    fn io_updateb(&self, reg: u32, mask: u8, data: u8);
}

/// One KCS channel.
///
/// Created by a backend and handed to
/// [`KcsBmcRegistry::add_device`](crate::KcsBmcRegistry::add_device) inside
/// an `Arc`. At most one [`KcsBmcClient`] is bound at a time; the binding is
/// guarded by an [`IrqSpinLock`] that the interrupt path shares.
pub struct KcsBmcDevice {
    channel: ChannelId,
    ioreg: KcsIoReg,
    ops: Box<dyn KcsBmcDeviceOps>,
    client: IrqSpinLock<Option<Weak<dyn KcsBmcClient>>>,
}

impl KcsBmcDevice {
    /// Creates an unbound channel.
    pub fn new(channel: ChannelId, ioreg: KcsIoReg, ops: Box<dyn KcsBmcDeviceOps>) -> Self {
        Self {
            channel,
            ioreg,
            ops,
            client: IrqSpinLock::new(None),
        }
    }

    /// Returns the channel number.
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Returns the register offsets.
    #[must_use]
    pub fn ioreg(&self) -> KcsIoReg {
        self.ioreg
    }

    // -----------------------------------------------------------------------
    // Register access
    // -----------------------------------------------------------------------

    /// Reads the input data register.
    pub fn read_data(&self) -> u8 {
        self.ops.io_inputb(self.ioreg.idr)
    }

    /// Writes the output data register.
    pub fn write_data(&self, data: u8) {
        self.ops.io_outputb(self.ioreg.odr, data);
    }

    /// Reads the status register.
    pub fn read_status(&self) -> u8 {
        self.ops.io_inputb(self.ioreg.str)
    }

    /// Writes the status register.
    pub fn write_status(&self, data: u8) {
        self.ops.io_outputb(self.ioreg.str, data);
    }

    /// Read-modify-write of the status register.
    pub fn update_status(&self, mask: u8, data: u8) {
        self.ops.io_updateb(self.ioreg.str, mask, data);
    }

    /// Changes which hardware conditions raise an interrupt.
    ///
    /// Used by `enable`/`disable`, and by a bound client to ask for
    /// [`EventMask::OBE`] while it has output pending.
    pub fn update_event_mask(&self, mask: EventMask, events: EventMask) {
        self.ops.irq_mask_update(mask, events);
    }

    // -----------------------------------------------------------------------
    // Client binding
    // -----------------------------------------------------------------------

    /// Binds `client` as the exclusive owner of this channel and enables
    /// the input-buffer-full interrupt.
    ///
    /// Runs with interrupts disabled on this CPU so the interrupt path never
    /// observes a half-made binding.
    ///
    /// # Errors
    ///
    /// Returns [`KcsError::Busy`] if another live client is bound; nothing
    /// is changed in that case.
    pub fn enable(&self, client: &Arc<dyn KcsBmcClient>) -> Result<(), KcsError> {
        let mut bound = self.client.lock();

        if let Some(current) = bound.as_ref() {
            if current.strong_count() > 0 {
                return Err(KcsError::Busy);
            }
            warn!(
                "kcs{}: reclaiming binding of a client dropped without disable",
                self.channel
            );
        }

        *bound = Some(Arc::downgrade(client));
        self.update_event_mask(EventMask::IBF, EventMask::IBF);
        debug!("kcs{}: client bound", self.channel);
        Ok(())
    }

    /// Releases the channel if `client` is its owner; otherwise does nothing.
    ///
    /// Masks both channel interrupts before clearing the binding.
    pub fn disable(&self, client: &Arc<dyn KcsBmcClient>) {
        let mut bound = self.client.lock();

        if bound.as_ref().is_some_and(|b| is_same_client(b, client)) {
            self.update_event_mask(EventMask::IBF | EventMask::OBE, EventMask::empty());
            *bound = None;
            debug!("kcs{}: client unbound", self.channel);
        }
    }

    /// Returns `true` if a live client is bound.
    pub fn is_bound(&self) -> bool {
        self.client
            .lock()
            .as_ref()
            .is_some_and(|b| b.strong_count() > 0)
    }

    /// Returns `true` if `client` is the bound client.
    pub fn is_bound_to(&self, client: &Arc<dyn KcsBmcClient>) -> bool {
        self.client
            .lock()
            .as_ref()
            .is_some_and(|b| is_same_client(b, client))
    }

    // -----------------------------------------------------------------------
    // Interrupt dispatch
    // -----------------------------------------------------------------------

    /// Interrupt entry point for this channel.
    ///
    /// Routes the interrupt to the bound client's
    /// [`event`](KcsBmcClient::event) and returns its outcome, or
    /// [`IrqReturn::None`] if no client is bound. The dispatch lock is held
    /// for the duration of the callback.
    pub fn handle_event(&self) -> IrqReturn {
        let mut bound = self.client.lock_in_irq();

        let Some(weak) = bound.as_ref() else {
            return IrqReturn::None;
        };

        if let Some(client) = weak.upgrade() {
            return client.event(self);
        }

        warn!(
            "kcs{}: interrupt for a client dropped without disable, masking",
            self.channel
        );
        self.update_event_mask(EventMask::IBF | EventMask::OBE, EventMask::empty());
        *bound = None;
        IrqReturn::None
    }
}

impl core::fmt::Debug for KcsBmcDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KcsBmcDevice")
            .field("channel", &self.channel)
            .field("ioreg", &self.ioreg)
            .finish_non_exhaustive()
    }
}

fn is_same_client(bound: &Weak<dyn KcsBmcClient>, client: &Arc<dyn KcsBmcClient>) -> bool {
    core::ptr::addr_eq(bound.as_ptr(), Arc::as_ptr(client))
}
