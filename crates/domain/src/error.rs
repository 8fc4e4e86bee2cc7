use thiserror::Error;

use crate::transport::{PrimitiveType, ValueId};

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Unknown input: {0}")]
    UnknownInput(String),

    #[error("No correlation for value {0}")]
    UnclassifiedIdentifier(ValueId),

    #[error("No conversion for primitive type {0}")]
    UnsupportedPrimitiveType(PrimitiveType),

    #[error("Invalid payload '{payload}' for {primitive}: {reason}")]
    InvalidPayload {
        payload: String,
        primitive: PrimitiveType,
        reason: String,
    },

    #[error("Transport write failed for device {device}, {target}: {reason}")]
    TransportWrite {
        device: String,
        target: String,
        reason: String,
    },

    #[error("Controller connection lost: {0}")]
    ConnectionLost(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
