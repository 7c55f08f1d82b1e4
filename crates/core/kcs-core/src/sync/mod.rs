//! Synchronization primitives.
//!
//! Two lock domains exist in the BMC layer and each gets its own type:
//!
//! - [`Mutex`]: the coarse, blocking lock. May be held across calls into
//!   driver code that itself blocks. Never taken from interrupt context.
//! - [`IrqSpinLock`]: the per-channel lock shared with the interrupt handler.
//!   Never sleeps.
//!
//! [`SpinLock`] is the plain building block for small `static` state that is
//! never touched from interrupt context.
//!
//! Lock ordering: a [`Mutex`] must never be acquired while an
//! [`IrqSpinLock`] is held.

mod irq_spinlock;
mod mutex;
mod spinlock;

pub(crate) mod loom_compat;

pub use irq_spinlock::{IrqSpinLock, IrqSpinLockGuard};
pub use mutex::{Mutex, MutexGuard, RelaxFn, set_relax_fn};
pub use spinlock::{SpinLock, SpinLockGuard};
