//! Process-wide registry instance.
//!
//! Kernels that want a single well-known registry install one with [`init`]
//! during boot and reach it through [`registry`]. Anything that can live
//! with an explicit [`KcsBmcRegistry`] value should prefer that.

use alloc::sync::Arc;

use kcs_core::sync::SpinLock;
use log::info;

use crate::error::KcsError;
use crate::registry::KcsBmcRegistry;

static KCS_BMC: SpinLock<Option<Arc<KcsBmcRegistry>>> = SpinLock::new(None);

/// Installs a fresh process-wide registry and returns a handle to it.
///
/// # Errors
///
/// Returns [`KcsError::Busy`] if a registry is already installed.
pub fn init() -> Result<Arc<KcsBmcRegistry>, KcsError> {
    let mut slot = KCS_BMC.lock();
    if slot.is_some() {
        return Err(KcsError::Busy);
    }
    let registry = Arc::new(KcsBmcRegistry::new());
    *slot = Some(Arc::clone(&registry));
    info!("kcs: registry initialized");
    Ok(registry)
}

/// Returns the process-wide registry, if one is installed.
pub fn registry() -> Option<Arc<KcsBmcRegistry>> {
    KCS_BMC.lock().clone()
}

/// Uninstalls the process-wide registry and shuts it down.
///
/// Handles obtained earlier stay valid but refer to an emptied registry.
///
/// # Errors
///
/// [`KcsError::NotFound`] if no registry is installed, otherwise whatever
/// [`KcsBmcRegistry::shutdown`] reports.
pub fn shutdown() -> Result<(), KcsError> {
    // Take it out first: shutdown blocks and runs driver callbacks.
    let registry = KCS_BMC.lock().take().ok_or(KcsError::NotFound)?;
    registry.shutdown()
}
