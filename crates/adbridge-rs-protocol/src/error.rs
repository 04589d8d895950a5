/// Errors reported by the native ads module for delegated requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    /// The native module does not implement the request.
    #[error("unsupported native call: {0}")]
    Unsupported(String),
    /// The native module rejected the request.
    #[error("native call failed ({code}): {message}")]
    Failed { code: String, message: String },
}

/// Failure reported by an application listener during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Upstream event missing the fields required for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventShapeError {
    /// The payload was not a JSON object.
    #[error("event is not an object")]
    NotAnObject,
    /// A required field is absent or not a string.
    #[error("event field `{0}` missing or not a string")]
    MissingField(&'static str),
}
