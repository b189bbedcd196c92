//! Host runtime bridge consumed by the resolver and the hook registry.
//!
//! The host side (process attachment, class loading, actual code patching)
//! is an external collaborator; these traits are the seam it plugs into.
//! `memory` provides the in-process reference implementation used by the
//! test-suite.

use std::sync::Arc;

use crate::error::{HookError, InvokeError, ResolutionError};
use crate::value::Value;

/// Replacement implementation installed over a resolved method.
///
/// Runs synchronously on whichever target thread invoked the method;
/// concurrent invocations run the closure concurrently, so it must not
/// carry per-invocation mutable state.
pub type Replacement = Arc<dyn Fn(&Invocation<'_>) -> Result<Value, InvokeError> + Send + Sync>;

/// One intercepted call, as seen by a replacement.
pub struct Invocation<'a> {
    receiver: Option<&'a Value>,
    args: &'a [Value],
    original: &'a dyn Method,
}

impl<'a> Invocation<'a> {
    pub fn new(receiver: Option<&'a Value>, args: &'a [Value], original: &'a dyn Method) -> Self {
        Self {
            receiver,
            args,
            original,
        }
    }

    /// Arguments exactly as the caller passed them.
    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// Invoke the original implementation with the unmodified arguments.
    /// Blocks the calling thread exactly as the un-hooked call would; a
    /// failure propagates unchanged.
    pub fn forward(&self) -> Result<Value, InvokeError> {
        self.original.invoke_original(self.receiver, self.args)
    }

    /// Invoke the original implementation with substituted arguments.
    /// Only the transform strategy's explicit mutation opt-in uses this.
    pub fn forward_with(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.original.invoke_original(self.receiver, args)
    }
}

/// The attached runtime session, able to surface loaded classes by name.
pub trait Runtime: Send + Sync {
    fn lookup_class(&self, name: &str) -> Result<Arc<dyn Class>, ResolutionError>;
}

/// A loaded class in the target process.
pub trait Class: Send + Sync {
    fn name(&self) -> &str;

    /// All overloads sharing `method` name, in declaration order.
    fn overloads(&self, method: &str) -> Vec<Arc<dyn Method>>;

    /// Instantiate the class. The cross-hook pipeline constructs its
    /// auxiliary class fresh per call through this.
    fn construct(&self, args: &[Value]) -> Result<Value, InvokeError>;
}

/// One concrete overload, resolvable to its original implementation and
/// patchable with a replacement.
pub trait Method: Send + Sync {
    fn name(&self) -> &str;

    /// Ordered, fully-qualified parameter type descriptors.
    fn param_types(&self) -> &[String];

    /// Invoke through the current dispatch: hits the installed replacement
    /// when one is present, the original otherwise.
    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError>;

    /// Invoke the original implementation, ignoring any replacement.
    fn invoke_original(
        &self,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Result<Value, InvokeError>;

    /// Redirect all future invocations to `replacement` until restored.
    fn replace(&self, replacement: Replacement) -> Result<(), HookError>;

    /// Restore the exact pre-hook dispatch.
    fn restore(&self) -> Result<(), HookError>;
}
