//! Error types for MSD347 printer operations.
//!
//! This module defines all possible errors that can occur during printer
//! communication, image rasterization, and status queries.

use thiserror::Error;

use crate::status::ErrorInfo;

/// Main error type for MSD347 printer operations.
///
/// Every error is returned to the caller as is. The driver never retries a
/// transfer or reinitializes the device on its own.
#[derive(Error, Debug)]
pub enum Error {
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// I/O error raised by a non-USB transport.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Device is offline")]
    DeviceOffline,

    /// The transport accepted fewer bytes than were supplied.
    #[error("Incomplete write: {written} of {expected} bytes")]
    IncompleteWrite { written: usize, expected: usize },

    /// Raster input exceeds the device limits.
    ///
    /// Raised before anything is written, so the device is left untouched.
    #[error("{dimension} {value} > max {max} {unit}")]
    OutOfRange {
        dimension: Dimension,
        value: usize,
        max: usize,
        unit: &'static str,
    },

    /// A status query returned fewer bytes than the protocol requires.
    #[error("{0}: expected to read a status byte")]
    ProtocolViolation(&'static str),

    /// Non-clear error status reported by the printer.
    #[error(transparent)]
    Device(ErrorInfo),

    /// The session was closed.
    #[error("Printer session is closed")]
    Closed,
}

impl Error {
    /// Whether the error came from the underlying channel rather than from
    /// the protocol or the device.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::UsbError(_)
                | Self::IoError(_)
                | Self::IncompleteWrite { .. }
                | Self::DeviceOffline
        )
    }
}

/// The raster bound that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Width => write!(f, "width"),
            Self::Height => write!(f, "height"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_the_bound() {
        let err = Error::OutOfRange {
            dimension: Dimension::Width,
            value: 130,
            max: 128,
            unit: "bytes (1024 dots)",
        };
        assert_eq!(err.to_string(), "width 130 > max 128 bytes (1024 dots)");
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_errors_are_classified() {
        assert!(Error::UsbError(rusb::Error::Pipe).is_transport());
        assert!(Error::IncompleteWrite {
            written: 3,
            expected: 8
        }
        .is_transport());
        assert!(!Error::ProtocolViolation("query error").is_transport());
        assert!(!Error::Closed.is_transport());
    }
}
