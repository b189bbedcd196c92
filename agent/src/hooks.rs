//! Hook registry: one active interceptor per method signature.
//!
//! Read-heavy process-wide table, written only at attach/detach. The
//! duplicate policy is reject: installing a second interceptor for an
//! already-registered signature fails with `HookError::Duplicate` instead
//! of silently replacing behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tapwire_intercept::bridge::{Method, Replacement};
use tapwire_intercept::error::HookError;
use tapwire_intercept::resolver::ResolvedMethod;
use tapwire_protocol::MethodSignature;

/// Token returned by `install`, required for `uninstall`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookHandle {
    signature: MethodSignature,
}

impl HookHandle {
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }
}

struct HookEntry {
    method: Arc<dyn Method>,
}

/// Process-wide hook table, torn down as a whole on drop.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Mutex<HashMap<MethodSignature, HookEntry>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an interceptor over a resolved method. From this moment
    /// every invocation by any caller in the process is redirected to the
    /// interceptor until uninstalled.
    pub fn install(
        &self,
        resolved: ResolvedMethod,
        interceptor: Replacement,
    ) -> Result<HookHandle, HookError> {
        let mut hooks = self.hooks.lock().unwrap();
        if hooks.contains_key(&resolved.signature) {
            return Err(HookError::Duplicate(resolved.signature));
        }

        resolved.method.replace(interceptor)?;
        debug!("hooked {}", resolved.signature);

        let signature = resolved.signature.clone();
        hooks.insert(
            resolved.signature,
            HookEntry {
                method: resolved.method,
            },
        );
        Ok(HookHandle { signature })
    }

    /// Remove a hook, restoring the exact pre-hook dispatch.
    pub fn uninstall(&self, handle: &HookHandle) -> Result<(), HookError> {
        let mut hooks = self.hooks.lock().unwrap();
        match hooks.remove(&handle.signature) {
            Some(entry) => {
                entry.method.restore()?;
                debug!("hook removed for {}", handle.signature);
                Ok(())
            }
            None => Err(HookError::NotInstalled(handle.signature.clone())),
        }
    }

    /// Signatures of all installed hooks.
    pub fn list(&self) -> Vec<MethodSignature> {
        self.hooks.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.lock().unwrap().is_empty()
    }

    /// Detach everything. Restoration failures are logged, not raised:
    /// teardown must not abort halfway through.
    pub fn clear(&self) {
        let mut hooks = self.hooks.lock().unwrap();
        for (signature, entry) in hooks.drain() {
            if let Err(e) = entry.method.restore() {
                warn!("failed to restore {}: {}", signature, e);
            } else {
                debug!("hook removed for {}", signature);
            }
        }
    }
}

impl Drop for HookRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapwire_intercept::memory::{ClassBuilder, MemoryRuntime};
    use tapwire_intercept::resolver::resolve;
    use tapwire_intercept::value::Value;

    fn target() -> (MemoryRuntime, Vec<String>) {
        let runtime = MemoryRuntime::new();
        runtime.register(ClassBuilder::new("com.example.Api").method(
            "check",
            &["java.lang.String"],
            |_, _| Ok(Value::Bool(false)),
        ));
        (runtime, vec!["java.lang.String".to_string()])
    }

    #[test]
    fn test_install_and_uninstall_round_trip() {
        let (runtime, params) = target();
        let registry = HookRegistry::new();

        let resolved = resolve(&runtime, "com.example.Api", "check", &params).unwrap();
        let method = resolved.method.clone();
        let handle = registry
            .install(resolved, Arc::new(|_| Ok(Value::Bool(true))))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list(), vec![handle.signature().clone()]);
        assert_eq!(method.invoke(None, &[Value::from("x")]).unwrap(), Value::Bool(true));

        registry.uninstall(&handle).unwrap();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
        assert_eq!(
            method.invoke(None, &[Value::from("x")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let (runtime, params) = target();
        let registry = HookRegistry::new();

        let first = resolve(&runtime, "com.example.Api", "check", &params).unwrap();
        let method = first.method.clone();
        registry
            .install(first, Arc::new(|_| Ok(Value::Bool(true))))
            .unwrap();

        let second = resolve(&runtime, "com.example.Api", "check", &params).unwrap();
        let err = registry
            .install(second, Arc::new(|_| Ok(Value::Bool(false))))
            .unwrap_err();
        assert!(matches!(err, HookError::Duplicate(_)));

        // The first interceptor stays active and alone.
        assert_eq!(registry.len(), 1);
        assert_eq!(method.invoke(None, &[Value::from("x")]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_uninstall_unknown_handle() {
        let registry = HookRegistry::new();
        let handle = HookHandle {
            signature: MethodSignature::new("a.B", "m", Vec::<String>::new()),
        };
        assert!(matches!(
            registry.uninstall(&handle).unwrap_err(),
            HookError::NotInstalled(_)
        ));
    }

    #[test]
    fn test_drop_restores_dispatch() {
        let (runtime, params) = target();
        let resolved = resolve(&runtime, "com.example.Api", "check", &params).unwrap();
        let method = resolved.method.clone();

        {
            let registry = HookRegistry::new();
            registry
                .install(resolved, Arc::new(|_| Ok(Value::Bool(true))))
                .unwrap();
            assert_eq!(method.invoke(None, &[]).unwrap(), Value::Bool(true));
        }
        assert_eq!(method.invoke(None, &[]).unwrap(), Value::Bool(false));
    }
}
