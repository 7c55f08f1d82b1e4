//! Device and driver registry with cross-notification.
//!
//! Devices and drivers may register in either order: a new device is offered
//! to every registered driver, and a new driver is offered every registered
//! device. Fan-out is best effort. Every failure is logged, the remaining
//! peers are still notified, and the last error observed is returned.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kcs_core::sync::Mutex;
use log::{error, info, warn};

use crate::device::KcsBmcDevice;
use crate::driver::KcsBmcDriver;
use crate::error::KcsError;
use crate::ChannelId;

struct Members {
    /// Registered channels, in registration order.
    devices: Vec<Arc<KcsBmcDevice>>,
    /// Registered drivers, in registration order.
    drivers: Vec<Arc<dyn KcsBmcDriver>>,
}

/// Registry of KCS channels and the drivers that serve them.
///
/// All operations serialize on one blocking mutex that stays held across
/// driver callbacks. Never call into the registry from interrupt context or
/// from inside a driver callback.
pub struct KcsBmcRegistry {
    members: Mutex<Members>,
}

impl KcsBmcRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Mutex::new(Members {
                devices: Vec::new(),
                drivers: Vec::new(),
            }),
        }
    }

    /// Registers a channel and offers it to every registered driver.
    ///
    /// # Errors
    ///
    /// [`KcsError::Busy`] if `device` is already registered. Otherwise the
    /// last error any driver's `add_device` returned; the device stays
    /// registered regardless.
    pub fn add_device(&self, device: Arc<KcsBmcDevice>) -> Result<(), KcsError> {
        let mut members = self.members.lock();

        if members.devices.iter().any(|d| Arc::ptr_eq(d, &device)) {
            return Err(KcsError::Busy);
        }
        members.devices.push(Arc::clone(&device));

        let mut result = Ok(());
        for driver in &members.drivers {
            if let Err(e) = driver.add_device(&device) {
                error!(
                    "kcs{}: failed to add device to driver '{}': {}",
                    device.channel(),
                    driver.name(),
                    e
                );
                result = Err(e);
            }
        }
        result
    }

    /// Unregisters a channel and tells every registered driver.
    ///
    /// Drivers are notified even if their `add_device` for this channel
    /// failed earlier.
    ///
    /// # Errors
    ///
    /// [`KcsError::NotFound`] if `device` is not registered (no driver is
    /// notified). Otherwise the last error any driver's `remove_device`
    /// returned; the device is unregistered regardless.
    pub fn remove_device(&self, device: &Arc<KcsBmcDevice>) -> Result<(), KcsError> {
        let mut members = self.members.lock();

        let Some(pos) = members.devices.iter().position(|d| Arc::ptr_eq(d, device)) else {
            warn!("kcs{}: removing unregistered device", device.channel());
            return Err(KcsError::NotFound);
        };
        members.devices.remove(pos);

        let mut result = Ok(());
        for driver in &members.drivers {
            if let Err(e) = driver.remove_device(device) {
                error!(
                    "kcs{}: failed to remove device from driver '{}': {}",
                    device.channel(),
                    driver.name(),
                    e
                );
                result = Err(e);
            }
        }
        result
    }

    /// Registers a driver and offers it every registered channel.
    ///
    /// # Errors
    ///
    /// [`KcsError::Busy`] if `driver` is already registered. Otherwise the
    /// last error the driver's `add_device` returned; the driver stays
    /// registered regardless.
    pub fn register_driver(&self, driver: Arc<dyn KcsBmcDriver>) -> Result<(), KcsError> {
        let mut members = self.members.lock();

        if members.drivers.iter().any(|d| same_driver(d, &driver)) {
            return Err(KcsError::Busy);
        }
        members.drivers.push(Arc::clone(&driver));
        info!("kcs: registered driver '{}'", driver.name());

        let mut result = Ok(());
        for device in &members.devices {
            if let Err(e) = driver.add_device(device) {
                error!(
                    "kcs{}: failed to add device to driver '{}': {}",
                    device.channel(),
                    driver.name(),
                    e
                );
                result = Err(e);
            }
        }
        result
    }

    /// Unregisters a driver, removing it from every registered channel.
    ///
    /// # Errors
    ///
    /// [`KcsError::NotFound`] if `driver` is not registered. Otherwise the
    /// last error the driver's `remove_device` returned; the driver is
    /// unregistered regardless.
    pub fn unregister_driver(&self, driver: &Arc<dyn KcsBmcDriver>) -> Result<(), KcsError> {
        let mut members = self.members.lock();

        let Some(pos) = members.drivers.iter().position(|d| same_driver(d, driver)) else {
            return Err(KcsError::NotFound);
        };
        members.drivers.remove(pos);
        info!("kcs: unregistered driver '{}'", driver.name());

        detach_driver(&members.devices, driver.as_ref())
    }

    /// Returns the registered channels in registration order.
    pub fn devices(&self) -> Vec<Arc<KcsBmcDevice>> {
        self.members.lock().devices.clone()
    }

    /// Finds a registered channel by number.
    pub fn device(&self, channel: ChannelId) -> Option<Arc<KcsBmcDevice>> {
        self.members
            .lock()
            .devices
            .iter()
            .find(|d| d.channel() == channel)
            .cloned()
    }

    /// Returns the number of registered channels.
    pub fn device_count(&self) -> usize {
        self.members.lock().devices.len()
    }

    /// Returns the number of registered drivers.
    pub fn driver_count(&self) -> usize {
        self.members.lock().drivers.len()
    }

    /// Tears the registry down.
    ///
    /// Unregisters drivers newest first, each receiving `remove_device` for
    /// every channel, then forgets all channels.
    ///
    /// # Errors
    ///
    /// The last error any driver's `remove_device` returned.
    pub fn shutdown(&self) -> Result<(), KcsError> {
        let mut members = self.members.lock();
        let mut result = Ok(());

        while let Some(driver) = members.drivers.pop() {
            if let Err(e) = detach_driver(&members.devices, driver.as_ref()) {
                result = Err(e);
            }
        }
        members.devices.clear();

        info!("kcs: registry shut down");
        result
    }
}

impl Default for KcsBmcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn detach_driver(devices: &[Arc<KcsBmcDevice>], driver: &dyn KcsBmcDriver) -> Result<(), KcsError> {
    let mut result = Ok(());
    for device in devices {
        if let Err(e) = driver.remove_device(device) {
            error!(
                "kcs{}: failed to remove device from driver '{}': {}",
                device.channel(),
                driver.name(),
                e
            );
            result = Err(e);
        }
    }
    result
}

fn same_driver(a: &Arc<dyn KcsBmcDriver>, b: &Arc<dyn KcsBmcDriver>) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
