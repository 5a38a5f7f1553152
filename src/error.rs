//! Error types for the input-mask addon.

use thiserror::Error;

/// Errors surfaced by mask construction and binding.
#[derive(Debug, Error)]
pub enum MaskError {
    /// A mask option was constructed with a missing/empty key or pattern.
    #[error("invalid mask option: {0}")]
    InvalidOption(String),

    /// The option payload could not be serialized for the client instance.
    /// The bind is abandoned; no masking element is left on the host.
    #[error("failed to serialize mask options: {0}")]
    Configuration(#[from] serde_json::Error),

    /// Unmasked-value binding was attempted against a host kind that does
    /// not support it.
    #[error("unsupported binding: {0}")]
    UnsupportedBinding(String),

    /// The host id does not resolve to a live host in the registry.
    #[error("unknown host: {0:?}")]
    UnknownHost(crate::host::HostId),
}
