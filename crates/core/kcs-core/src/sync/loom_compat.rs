//! Loom compatibility shim.
//!
//! When compiled with `cfg(loom)`, re-exports loom's atomics and spin hint.
//! Otherwise, re-exports the `core` equivalents.
//!
//! The lock types use these so their acquire/release paths can be explored
//! under loom's deterministic scheduler without code changes.

// ---------------------------------------------------------------------------
// Loom mode
// ---------------------------------------------------------------------------

#[cfg(loom)]
pub(crate) use loom::hint::spin_loop;
#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

#[cfg(not(loom))]
pub(crate) use core::hint::spin_loop;
#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, Ordering};
