//! I/O configuration handed to an engine at initialization.

use alloc::sync::Arc;

/// Address space the interface registers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrSpace {
    /// x86 I/O ports.
    Port,
    /// Memory-mapped registers.
    Memory,
}

/// Width of one register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegSize {
    /// 8-bit.
    One = 1,
    /// 16-bit.
    Two = 2,
    /// 32-bit.
    Four = 4,
    /// 64-bit.
    Eight = 8,
}

impl RegSize {
    /// Returns the width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self as u32
    }

    /// Converts a byte width, rejecting anything but 1, 2, 4 or 8.
    #[must_use]
    pub const fn from_bytes(bytes: u32) -> Option<Self> {
        match bytes {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }
}

/// Register accessor supplied by the platform.
///
/// Offsets are relative to [`SiSmIo::addr_data`] and already include
/// spacing; see [`SiSmIo::register_offset`]. Accesses are made at the
/// configured [`RegSize`]; values narrower than 64 bits live in the low
/// bits.
pub trait SiIoAccess: Send + Sync {
    /// Reads the `size`-wide register at `offset`.
    fn input(&self, offset: u64, size: RegSize) -> u64;
    /// Writes the `size`-wide register at `offset`.
    fn output(&self, offset: u64, size: RegSize, value: u64);
}

/// Where and how an engine reaches its registers.
#[derive(Clone)]
pub struct SiSmIo {
    /// Address space of `addr_data`.
    pub addr_space: AddrSpace,
    /// Base address of register 0.
    pub addr_data: u64,
    /// Distance in bytes between consecutive registers.
    pub regspacing: u32,
    /// Access width.
    pub regsize: RegSize,
    /// Bit position of the data byte within a register access.
    pub regshift: u8,
    /// Register accessor.
    pub io: Arc<dyn SiIoAccess>,
}

impl SiSmIo {
    /// Byte offset of register `index` from the base address.
    #[must_use]
    pub fn register_offset(&self, index: u32) -> u64 {
        u64::from(index) * u64::from(self.regspacing)
    }

    /// Bytes of address space covered by `register_count` registers.
    ///
    /// This is what `init_data` reports for reservation.
    #[must_use]
    pub fn io_size(&self, register_count: u32) -> u64 {
        match register_count {
            0 => 0,
            n => self.register_offset(n - 1) + u64::from(self.regsize.bytes()),
        }
    }

    /// Reads register `index` at the configured width and extracts the
    /// data byte at `regshift`.
    pub fn read_reg(&self, index: u32) -> u8 {
        let raw = self.io.input(self.register_offset(index), self.regsize);
        let shifted = raw.checked_shr(u32::from(self.regshift)).unwrap_or(0);
        shifted.to_le_bytes()[0]
    }

    /// Writes `value` into register `index` at bit position `regshift`,
    /// at the configured width.
    pub fn write_reg(&self, index: u32, value: u8) {
        let raw = u64::from(value)
            .checked_shl(u32::from(self.regshift))
            .unwrap_or(0);
        self.io.output(self.register_offset(index), self.regsize, raw);
    }
}

impl core::fmt::Debug for SiSmIo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SiSmIo")
            .field("addr_space", &self.addr_space)
            .field("addr_data", &format_args!("{:#x}", self.addr_data))
            .field("regspacing", &self.regspacing)
            .field("regsize", &self.regsize)
            .field("regshift", &self.regshift)
            .finish_non_exhaustive()
    }
}
