//! Error types for the bridge and its facades.

use adbridge_rs_protocol::NativeError;
use thiserror::Error;

/// Errors returned by bridge, ad, and consent operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The native SDK backing the named module is not installed.
    #[error("native module `{0}` is missing; install and link the native SDK")]
    MissingNativeCapability(String),
    /// A delegated request was rejected by the native module.
    #[error("native error: {0}")]
    Native(#[from] NativeError),
    /// `show` was called before the ad reported `onAdLoaded`.
    #[error("ad not loaded: {0}")]
    NotLoaded(String),
    /// Arguments rejected before reaching the native module.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The bridge was torn down.
    #[error("bridge destroyed")]
    Destroyed,
}
