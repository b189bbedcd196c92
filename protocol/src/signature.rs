//! Method signature identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies exactly one overload of one method on one class.
///
/// The hook registry keys on this type: no two hooks may target the same
/// signature at the same time. Parameter types are fully-qualified
/// descriptors in declaration order, e.g. `["java.lang.String",
/// "okhttp3.Headers$Builder"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Fully-qualified class name.
    pub class: String,
    /// Method name (shared by all overloads).
    pub method: String,
    /// Ordered parameter type descriptors.
    #[serde(default)]
    pub param_types: Vec<String>,
}

impl MethodSignature {
    pub fn new<C, M, P, T>(class: C, method: M, param_types: P) -> Self
    where
        C: Into<String>,
        M: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            class: class.into(),
            method: method.into(),
            param_types: param_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Short label for log lines and hook ids: unqualified class plus
    /// method name, e.g. `ApiService.checkResponseHash`.
    pub fn short_label(&self) -> String {
        let class = self.class.rsplit('.').next().unwrap_or(&self.class);
        format!("{}.{}", class, self.method)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.class,
            self.method,
            self.param_types.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_param_types() {
        let sig = MethodSignature::new(
            "com.digitral.network.ApiService",
            "checkResponseHash",
            ["java.lang.String", "java.lang.String"],
        );
        assert_eq!(
            sig.to_string(),
            "com.digitral.network.ApiService.checkResponseHash(java.lang.String, java.lang.String)"
        );
    }

    #[test]
    fn test_short_label_strips_package() {
        let sig = MethodSignature::new("com.digitral.common.MixUpValues", "encryption", ["java.lang.String"]);
        assert_eq!(sig.short_label(), "MixUpValues.encryption");
    }

    #[test]
    fn test_signature_identity_includes_params() {
        let a = MethodSignature::new("C", "m", ["int"]);
        let b = MethodSignature::new("C", "m", ["long"]);
        assert_ne!(a, b);
        assert_eq!(a, MethodSignature::new("C", "m", ["int"]));
    }
}
