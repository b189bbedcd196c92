//! tapwire agent: hook registry, interceptor strategies and attach session.
//!
//! The host runtime's process-attachment and code-injection mechanism is an
//! external collaborator: a `Session` assumes the `Runtime` bridge handed
//! to it is already attached to the target process. Everything a session
//! installs is torn down together at detach; nothing survives a process
//! restart, and re-attachment re-resolves and re-installs from scratch.

pub mod config;
pub mod hooks;
pub mod pipeline;
pub mod sink;
pub mod strategy;

#[cfg(test)]
mod test_utils;

pub use config::ConfigError;
pub use hooks::{HookHandle, HookRegistry};
pub use sink::{LogSink, MemorySink, ObservationSink, WriterSink};
pub use strategy::Strategy;

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use tapwire_intercept::bridge::Runtime;
use tapwire_intercept::error::HookError;
use tapwire_intercept::resolver::resolve_signature;
use tapwire_protocol::{HookSpec, MethodSignature};

/// Outcome of installing a declarative hook list. Failures are per-hook:
/// one entry failing to resolve or validate never aborts the others.
#[derive(Default)]
pub struct InstallReport {
    pub installed: Vec<HookHandle>,
    pub failed: Vec<(MethodSignature, anyhow::Error)>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One attached instrumentation session.
///
/// Owns the hook registry for its lifetime; dropping the session restores
/// every hooked method to its pre-hook dispatch.
pub struct Session {
    runtime: Arc<dyn Runtime>,
    registry: HookRegistry,
    sink: Arc<dyn ObservationSink>,
}

impl Session {
    /// Begin a session over an already-attached runtime bridge.
    pub fn attach(runtime: Arc<dyn Runtime>, sink: Arc<dyn ObservationSink>) -> Self {
        info!("session attached");
        Self {
            runtime,
            registry: HookRegistry::new(),
            sink,
        }
    }

    /// Resolve and install every entry of the hook list, reporting each
    /// failure once instead of aborting the remainder.
    pub fn install_hooks(&self, specs: &[HookSpec]) -> InstallReport {
        let mut report = InstallReport::default();
        for spec in specs {
            let signature = spec.signature();
            match self.install_hook(spec) {
                Ok(handle) => report.installed.push(handle),
                Err(err) => {
                    warn!("skipping hook {}: {:#}", signature, err);
                    report.failed.push((signature, err));
                }
            }
        }
        info!(
            "installed {}/{} hooks",
            report.installed.len(),
            specs.len()
        );
        report
    }

    /// Resolve and install a single hook entry.
    pub fn install_hook(&self, spec: &HookSpec) -> Result<HookHandle> {
        let strategy = Strategy::from_spec(spec)?;
        let resolved = resolve_signature(self.runtime.as_ref(), &spec.signature())?;
        let hook_id = resolved.signature.short_label();
        let interceptor = strategy::build_interceptor(
            hook_id,
            strategy,
            Arc::clone(&self.runtime),
            Arc::clone(&self.sink),
        );
        Ok(self.registry.install(resolved, interceptor)?)
    }

    pub fn uninstall(&self, handle: &HookHandle) -> std::result::Result<(), HookError> {
        self.registry.uninstall(handle)
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Tear down every installed hook. Also happens implicitly on drop.
    pub fn detach(&self) {
        self.registry.clear();
        info!("session detached");
    }
}
