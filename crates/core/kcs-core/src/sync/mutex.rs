//! Blocking mutual exclusion lock for attach-time work.
//!
//! Unlike [`SpinLock`](super::SpinLock), a [`Mutex`] is expected to be held
//! for long stretches (across calls into driver code that may itself block)
//! so waiters do not burn the CPU: every failed acquisition attempt calls the
//! registered relax hook, which a kernel points at its scheduler's yield.
//! Before [`set_relax_fn`] is called the hook is a plain spin hint.
//!
//! A `Mutex` must never be taken from interrupt context, nor while an
//! [`IrqSpinLock`](super::IrqSpinLock) is held.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::AtomicPtr;

use super::loom_compat::{AtomicBool, Ordering};

/// The signature of the relax hook called while waiting for a [`Mutex`].
pub type RelaxFn = fn();

fn spin_relax() {
    core::hint::spin_loop();
}

static RELAX_FN: AtomicPtr<()> = AtomicPtr::new(spin_relax as *mut ());

/// Registers the function waiters call between acquisition attempts.
///
/// # Safety
///
/// The provided function must be safe to call from any non-interrupt
/// context and must not acquire any [`Mutex`].
pub unsafe fn set_relax_fn(f: RelaxFn) {
    RELAX_FN.store(f as *mut (), core::sync::atomic::Ordering::Release);
}

#[cfg(not(loom))]
#[inline]
fn relax() {
    let ptr = RELAX_FN.load(core::sync::atomic::Ordering::Acquire);
    // SAFETY: Only valid `RelaxFn` pointers (or the initial `spin_relax`)
    // are ever stored into RELAX_FN.
    let f: RelaxFn = unsafe { core::mem::transmute(ptr) };
    f();
}

#[cfg(loom)]
#[inline]
fn relax() {
    super::loom_compat::spin_loop();
}

/// A blocking mutual exclusion lock.
pub struct Mutex<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: The Mutex ensures exclusive access to `T` via atomic operations.
unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Creates a new unlocked `Mutex` wrapping `value`.
    #[cfg(not(loom))]
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Creates a new unlocked `Mutex` wrapping `value`.
    #[cfg(loom)]
    pub fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, relaxing through the registered hook while it is
    /// held elsewhere.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            while self.locked.load(Ordering::Relaxed) {
                relax();
            }
        }
    }

    /// Attempts to acquire the lock without waiting.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| MutexGuard { lock: self })
    }

    /// Returns a mutable reference to the data; no locking is needed since
    /// the borrow is exclusive.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

/// RAII guard that releases the [`Mutex`] when dropped.
pub struct MutexGuard<'a, T> {
    lock: &'a Mutex<T>,
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
