use crate::pin::PinMode;
use thiserror::Error;

/// Errors that can occur when operating on Tegra GPIO pins.
///
/// Caller-contract violations (bad port or pin numbers, modes a pin class
/// cannot accept) are reported as recoverable errors rather than asserts;
/// the same discipline is applied uniformly across the port-manager and
/// camera-VI paths.
#[derive(Error, Debug)]
pub enum Error {
    /// GPIO port number outside the range the hardware reports.
    #[error("GPIO port {port} out of range (0-{max})")]
    InvalidPort {
        /// The port number that was requested.
        port: u32,
        /// Highest valid port number.
        max: u32,
    },
    /// GPIO pin number outside the range of its port.
    #[error("GPIO pin {pin} out of range (0-{max})")]
    InvalidPin {
        /// The pin number that was requested.
        pin: u32,
        /// Highest valid pin number.
        max: u32,
    },
    /// A camera-VI pin was acquired while still held by another owner.
    #[error("camera-VI pin {pin} is already allocated")]
    AlreadyAllocated {
        /// The contested pin index.
        pin: u32,
    },
    /// Camera-VI pins are output-only; any other mode request is rejected.
    #[error("pin mode {mode:?} is not supported on camera-VI pins (output only)")]
    UnsupportedCameraMode {
        /// The rejected mode.
        mode: PinMode,
    },
    /// Feature is not supported by this hardware revision.
    #[error("feature not supported by this hardware: {0}")]
    UnsupportedFeature(String),
    /// `write_pins` was called with mismatched handle/state slice lengths.
    #[error("handle/state count mismatch ({handles} handles, {states} states)")]
    LengthMismatch {
        /// Number of handles supplied.
        handles: usize,
        /// Number of states supplied.
        states: usize,
    },
    /// Board discovery found no connectivity entry for the requested GUID.
    #[error("voltage-rail connectivity not present on this board")]
    ModuleNotPresent,
    /// A power-management collaborator call failed.
    #[error("power management call failed: {0}")]
    Power(String),
    /// The external GPIO controller reported a failure.
    #[error("external GPIO controller error: {0}")]
    External(String),
}

/// Result type alias for Tegra GPIO operations.
pub type Result<T> = std::result::Result<T, Error>;

// Helpers for creating specific UnsupportedFeature errors
pub(crate) fn unsupported_edge_interrupts() -> Error {
    Error::UnsupportedFeature(
        "edge-triggered interrupt modes require edge-interrupt capable hardware".to_string(),
    )
}
pub(crate) fn unsupported_irq_query() -> Error {
    Error::UnsupportedFeature(
        "interrupt numbers exist for internal controller pins only".to_string(),
    )
}
