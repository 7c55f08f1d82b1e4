//! Contract between the IPMI system-interface layer and its low-level
//! transport engines (KCS, SMIC, BT).
//!
//! The upper layer owns policy: message queues, retries, timers and the
//! choice between interrupt and polled operation. An engine owns the
//! byte-level handshake with the BMC and is driven entirely through
//! [`SiStateMachine`]. Engines advertise themselves with a static
//! [`SmDescriptor`] so the upper layer can size and create one without
//! knowing its concrete type.
//!
//! [`run_transaction`] is a synchronous poller for callers that have no
//! interrupt (early boot, panic paths, tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub mod handlers;
pub mod io;
pub mod poll;
pub mod result;

#[cfg(test)]
mod testing;

pub use error::{DetectError, ResultError, StartError, TransactionError};
pub use handlers::{SiStateMachine, SmDescriptor};
pub use io::{AddrSpace, RegSize, SiIoAccess, SiSmIo};
pub use poll::{SmTimer, run_transaction};
pub use result::SmResult;
