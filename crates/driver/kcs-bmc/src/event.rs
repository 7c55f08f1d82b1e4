//! Interrupt event types.

use bitflags::bitflags;

bitflags! {
    /// Hardware conditions that can raise a channel interrupt.
    ///
    /// Passed to [`KcsBmcDeviceOps::irq_mask_update`](crate::KcsBmcDeviceOps::irq_mask_update)
    /// as both the set of bits to change and their new values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        /// Output buffer empty: the host consumed the byte in ODR.
        const OBE = 1 << 0;
        /// Input buffer full: the host wrote a byte to IDR.
        const IBF = 1 << 1;
    }
}

/// Outcome of interrupt handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not for us (or nobody is bound).
    None,
    /// The interrupt was handled.
    Handled,
}

impl IrqReturn {
    /// Returns `true` for [`IrqReturn::Handled`].
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

impl From<bool> for IrqReturn {
    fn from(handled: bool) -> Self {
        if handled { Self::Handled } else { Self::None }
    }
}
