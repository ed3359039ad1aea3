//! Error types for the lm75-thermal crate.

use thiserror::Error;

use crate::bus::TransportError;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error from the underlying bus collaborator.
    #[error("Bus transport error: {0}")]
    Transport(#[from] TransportError),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// The invalid value that was provided.
        value: String,
    },

    /// Operation requires a live event queue but the dispatch task is gone.
    #[error("Dispatch task not running")]
    InvalidState,

    /// The event queue is at capacity; the event was not enqueued.
    ///
    /// Recoverable: the caller may retry or drop the event.
    #[error("Event queue full")]
    QueueFull,

    /// An event tag that maps to no known event variant.
    #[error("Invalid queue message tag: {tag:#04x}")]
    InvalidQueueMessage {
        /// The unrecognized tag byte.
        tag: u8,
    },

    /// Waiting on the event queue failed.
    #[error("Event queue receive failed")]
    FailedQueueOperation,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
