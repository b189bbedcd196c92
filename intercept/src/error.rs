//! Error taxonomy for resolution, installation, forwarding and derivation.
//!
//! Failure isolation is the ruling invariant: a failure in one hook must
//! never destabilize other hooks or the target's unrelated code paths.
//! Resolution and duplicate errors abort one hook's installation;
//! forwarding errors pass through to the target unchanged; derivation
//! errors are recovered locally by the owning interceptor.

use thiserror::Error;

use tapwire_protocol::MethodSignature;

/// Class, method or overload could not be located in the target process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("method not found: {class}.{method}")]
    MethodNotFound { class: String, method: String },

    #[error("no overload of {class}.{method} matches ({params})")]
    NoMatchingOverload {
        class: String,
        method: String,
        params: String,
    },

    #[error("{count} overloads of {class}.{method} match ({params})")]
    AmbiguousOverload {
        class: String,
        method: String,
        params: String,
        count: usize,
    },
}

/// Installation or removal of a hook failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    /// The registry rejects a second interceptor for an already-hooked
    /// signature rather than silently replacing it.
    #[error("signature already hooked: {0}")]
    Duplicate(MethodSignature),

    #[error("no hook installed for {0}")]
    NotInstalled(MethodSignature),

    /// The bridge reports a replacement already present on the method.
    #[error("replacement already installed on {0}")]
    AlreadyReplaced(String),

    #[error("no replacement to restore on {0}")]
    NotReplaced(String),
}

/// The invoked implementation (original method, constructor, or instance
/// call) raised. When this comes out of a forwarding call it propagates to
/// the interceptor's caller unchanged, so the target's own error handling
/// behaves exactly as without instrumentation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{target}: {message}")]
pub struct InvokeError {
    /// Qualified name of what was being invoked, e.g. `MixUpValues.encryption`.
    pub target: String,
    pub message: String,
}

impl InvokeError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// The auxiliary derivation pipeline failed. Recovered locally by the
/// owning interceptor (log-and-continue), never escalated.
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("aux class {0} did not construct an object")]
    NotAnObject(String),
}
