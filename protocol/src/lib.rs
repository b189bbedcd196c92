//! Common types shared between the tapwire agent and operator tooling.

pub mod config;
pub mod event;
pub mod format;
pub mod signature;

pub use config::*;
pub use event::*;
pub use signature::MethodSignature;
