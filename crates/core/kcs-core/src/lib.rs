//! Core types and synchronization primitives for the KCS BMC layer.
//!
//! This crate holds the host-testable building blocks shared by the channel
//! registry and the protocol engines: typed identifiers and the two lock
//! families the dispatch layer is built on (a blocking [`sync::Mutex`] for
//! attach-time registry work and an interrupt-safe [`sync::IrqSpinLock`] for
//! per-channel dispatch).
//!
//! Everything here is `no_std` so it can run inside a kernel, and can be
//! tested with `cargo test` and loom on the host.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod id;
pub mod sync;
