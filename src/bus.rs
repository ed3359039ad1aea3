//! Bus transport boundary.
//!
//! The sensor sits on a register-addressed serial bus (I2C or similar).
//! This crate never touches the wire itself; it talks to a [`BusTransport`]
//! implementation supplied by the host. The transport is synchronous: calls
//! either complete or return a [`TransportError`], and any bus-level timeout
//! policy lives inside the implementation.

use thiserror::Error;

/// Error reported by a bus transport implementation.
///
/// Opaque to the rest of the crate; it is propagated verbatim through
/// [`crate::Error::Transport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The addressed device did not acknowledge.
    #[error("Device {address:#04x} did not acknowledge")]
    Nack {
        /// The bus address that was targeted.
        address: u8,
    },

    /// The bus operation timed out.
    #[error("Bus operation timed out")]
    Timeout,

    /// Transport-specific failure.
    #[error("Bus failure: {0}")]
    Other(String),
}

/// Abstract register-addressed bus transport.
///
/// Implementations must serialize concurrent callers themselves; this crate
/// only ever issues bus calls from the single dispatch task, so a plain
/// exclusive borrow is sufficient on the library side.
#[cfg_attr(test, mockall::automock)]
pub trait BusTransport: Send {
    /// Write `bytes` to the device at `address`.
    fn send(&mut self, address: u8, bytes: &[u8]) -> std::result::Result<(), TransportError>;

    /// Read exactly `buffer.len()` bytes from the device at `address`.
    fn receive(&mut self, address: u8, buffer: &mut [u8])
        -> std::result::Result<(), TransportError>;
}
