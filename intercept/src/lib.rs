//! tapwire-intercept: runtime-bridge abstraction and signature resolution.
//!
//! The bridge traits model what the host runtime's injection layer provides:
//! class lookup, overload enumeration, invocation, and in-place method
//! replacement. Everything above (registry, strategies, observation) lives
//! in the agent crate; everything below (process attachment, the target's
//! own class loading) is the host runtime's business.

pub mod bridge;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod value;

// Re-exports for convenience (flattened imports)
pub use bridge::{Class, Invocation, Method, Replacement, Runtime};
pub use error::{DerivationError, HookError, InvokeError, ResolutionError};
pub use resolver::{resolve, ResolvedMethod};
pub use value::{Instance, InstanceRef, Value};
