//! Interrupt-safe spin lock.
//!
//! Shared between an interrupt handler and ordinary kernel code. Ordinary
//! code acquires it with [`IrqSpinLock::lock`], which disables interrupts on
//! the current CPU first and restores the previous state on release, so the
//! handler can never spin on a lock its own CPU already holds. The handler
//! itself uses [`IrqSpinLock::lock_in_irq`], which leaves the interrupt flag
//! alone.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::loom_compat::{AtomicBool, Ordering, spin_loop};

/// A spin lock that can be shared with interrupt handlers.
pub struct IrqSpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: Same reasoning as SpinLock: atomic ops ensure exclusive access.
unsafe impl<T: Send> Send for IrqSpinLock<T> {}
unsafe impl<T: Send> Sync for IrqSpinLock<T> {}

impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    #[cfg(not(loom))]
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Creates a new unlocked `IrqSpinLock`.
    #[cfg(loom)]
    pub fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, disabling interrupts first.
    ///
    /// The previous interrupt state is restored when the guard drops.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T> {
        let saved_flags = save_flags_and_cli();
        self.acquire();
        IrqSpinLockGuard {
            lock: self,
            saved_flags: Some(saved_flags),
            _not_send: PhantomData,
        }
    }

    /// Acquires the lock from interrupt context.
    ///
    /// Does not touch the interrupt flag: the caller is an interrupt handler,
    /// so interrupts on this CPU are already masked. Calling this from
    /// ordinary context with interrupts enabled lets the handler deadlock
    /// against the caller.
    pub fn lock_in_irq(&self) -> IrqSpinLockGuard<'_, T> {
        self.acquire();
        IrqSpinLockGuard {
            lock: self,
            saved_flags: None,
            _not_send: PhantomData,
        }
    }

    /// Attempts to acquire the lock without spinning, disabling interrupts
    /// on success.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T>> {
        let saved_flags = save_flags_and_cli();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(IrqSpinLockGuard {
                lock: self,
                saved_flags: Some(saved_flags),
                _not_send: PhantomData,
            })
        } else {
            restore_flags(saved_flags);
            None
        }
    }

    /// Returns `true` if the lock is currently held by anyone.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    fn acquire(&self) {
        // TTAS spin to acquire.
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
    }
}

/// RAII guard that releases the lock and restores interrupt state on drop.
///
/// Not `Send`: the saved interrupt state belongs to the acquiring CPU.
pub struct IrqSpinLockGuard<'a, T> {
    lock: &'a IrqSpinLock<T>,
    saved_flags: Option<u64>,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for IrqSpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for IrqSpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for IrqSpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);

        if let Some(flags) = self.saved_flags {
            restore_flags(flags);
        }
    }
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn save_flags_and_cli() -> u64 {
    let flags: u64;
    // SAFETY: Reading RFLAGS and disabling interrupts is safe in kernel mode.
    unsafe {
        core::arch::asm!(
            "pushfq",
            "pop {}",
            "cli",
            out(reg) flags,
            options(nomem),
        );
    }
    flags
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn restore_flags(flags: u64) {
    // Only the IF bit matters.
    if flags & (1 << 9) != 0 {
        // SAFETY: Re-enabling interrupts is safe; we are restoring a previous state.
        unsafe {
            core::arch::asm!("sti", options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(all(target_os = "none", target_arch = "aarch64"))]
#[inline]
fn save_flags_and_cli() -> u64 {
    let flags: u64;
    // SAFETY: Reading DAIF and masking interrupts is safe in kernel mode.
    unsafe {
        core::arch::asm!(
            "mrs {}, DAIF",
            "msr DAIFSet, #0xf",
            out(reg) flags,
            options(nomem),
        );
    }
    flags
}

#[cfg(all(target_os = "none", target_arch = "aarch64"))]
#[inline]
fn restore_flags(flags: u64) {
    // SAFETY: Restoring DAIF is safe; we are restoring a previous state.
    unsafe {
        core::arch::asm!(
            "msr DAIF, {}",
            in(reg) flags,
            options(nomem, nostack, preserves_flags),
        );
    }
}

#[cfg(not(all(target_os = "none", any(target_arch = "x86_64", target_arch = "aarch64"))))]
#[inline]
fn save_flags_and_cli() -> u64 {
    0
}

#[cfg(not(all(target_os = "none", any(target_arch = "x86_64", target_arch = "aarch64"))))]
#[inline]
fn restore_flags(_flags: u64) {}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn lock_and_lock_in_irq_share_state() {
        let lock = IrqSpinLock::new(0u8);
        *lock.lock() = 1;
        {
            let mut guard = lock.lock_in_irq();
            assert_eq!(*guard, 1);
            *guard = 2;
        }
        assert_eq!(*lock.lock(), 2);
    }

    #[test]
    fn try_lock_reports_contention() {
        let lock = IrqSpinLock::new(());
        let guard = lock.lock();
        assert!(lock.is_locked());
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(!lock.is_locked());
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn irq_and_process_paths_exclude_each_other() {
        let lock = Arc::new(IrqSpinLock::new(0u64));
        let irq = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..2000 {
                    *lock.lock_in_irq() += 1;
                }
            })
        };
        for _ in 0..2000 {
            *lock.lock() += 1;
        }
        irq.join().unwrap();
        assert_eq!(*lock.lock(), 4000);
    }
}
