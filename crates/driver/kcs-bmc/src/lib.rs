//! KCS BMC channel registry and interrupt dispatch.
//!
//! Sits between the hardware backends that expose a BMC's KCS register
//! interface and the subsystems that speak a protocol over it:
//!
//! - **Backends** implement [`KcsBmcDeviceOps`] (byte I/O on the data and
//!   status registers plus interrupt-mask control) and register a
//!   [`KcsBmcDevice`] with the [`KcsBmcRegistry`].
//! - **Drivers** implement [`KcsBmcDriver`] and are told about every channel
//!   that appears or disappears, in whichever order the two sides register.
//! - **Clients** implement [`KcsBmcClient`] and bind exclusively to one
//!   channel with [`KcsBmcDevice::enable`]; from then on the channel's
//!   interrupts are routed to them by [`KcsBmcDevice::handle_event`].
//!
//! The registry never interprets the bytes that flow through a channel.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod client;
pub mod device;
pub mod driver;
pub mod error;
pub mod event;
pub mod global;
pub mod registry;

#[cfg(test)]
mod testing;

pub use client::KcsBmcClient;
pub use device::{KcsBmcDevice, KcsBmcDeviceOps, KcsIoReg};
pub use driver::KcsBmcDriver;
pub use error::KcsError;
pub use event::{EventMask, IrqReturn};
pub use kcs_core::id::ChannelId;
pub use registry::KcsBmcRegistry;
