//! Overload resolution by exact parameter-type signature.

use std::sync::Arc;

use log::debug;
use tapwire_protocol::MethodSignature;

use crate::bridge::{Class, Method, Runtime};
use crate::error::ResolutionError;

/// A uniquely resolved overload, ready for installation.
pub struct ResolvedMethod {
    pub class: Arc<dyn Class>,
    pub method: Arc<dyn Method>,
    pub signature: MethodSignature,
}

impl std::fmt::Debug for ResolvedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMethod")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Locate the single overload of `class_name.method_name` whose parameter
/// list matches `param_types` exactly.
///
/// Pure lookup, no side effects: a failed resolution leaves nothing behind,
/// so one hook's resolution failure cannot affect already-installed hooks.
pub fn resolve(
    runtime: &dyn Runtime,
    class_name: &str,
    method_name: &str,
    param_types: &[String],
) -> Result<ResolvedMethod, ResolutionError> {
    let class = runtime.lookup_class(class_name)?;

    let overloads = class.overloads(method_name);
    if overloads.is_empty() {
        return Err(ResolutionError::MethodNotFound {
            class: class_name.to_string(),
            method: method_name.to_string(),
        });
    }

    let mut matches: Vec<Arc<dyn Method>> = overloads
        .into_iter()
        .filter(|m| m.param_types() == param_types)
        .collect();

    match matches.len() {
        1 => {
            let method = matches.remove(0);
            let signature =
                MethodSignature::new(class_name, method_name, param_types.iter().cloned());
            debug!("resolved {}", signature);
            Ok(ResolvedMethod {
                class,
                method,
                signature,
            })
        }
        0 => Err(ResolutionError::NoMatchingOverload {
            class: class_name.to_string(),
            method: method_name.to_string(),
            params: param_types.join(", "),
        }),
        count => Err(ResolutionError::AmbiguousOverload {
            class: class_name.to_string(),
            method: method_name.to_string(),
            params: param_types.join(", "),
            count,
        }),
    }
}

/// Resolve from a signature instead of loose parts.
pub fn resolve_signature(
    runtime: &dyn Runtime,
    signature: &MethodSignature,
) -> Result<ResolvedMethod, ResolutionError> {
    resolve(
        runtime,
        &signature.class,
        &signature.method,
        &signature.param_types,
    )
}
