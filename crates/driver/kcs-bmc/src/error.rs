//! KCS BMC error types.

use core::fmt;

/// Errors returned by registry, binding and driver operations.
///
/// Drivers report their own failures through the same type; the registry
/// passes whatever a driver returned back to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KcsError {
    /// The channel already has a bound client, or the object is already
    /// registered.
    Busy,
    /// An argument was outside the accepted range.
    InvalidArgument,
    /// The device, driver or registry was not found.
    NotFound,
    /// A driver could not allocate the resources for a channel.
    NoMemory,
    /// A hardware access failed.
    Io,
    /// The operation is not supported by this driver or backend.
    Unsupported,
}

impl fmt::Display for KcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("resource busy"),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::NotFound => f.write_str("not found"),
            Self::NoMemory => f.write_str("out of memory"),
            Self::Io => f.write_str("I/O error"),
            Self::Unsupported => f.write_str("operation not supported"),
        }
    }
}

impl core::error::Error for KcsError {}
