//! Declarative hook configuration.
//!
//! The set of hooked signatures and per-hook strategies is a static list
//! decided before attach; there is no runtime reconfiguration surface.
//! These are the raw serde shapes — validation (bypass needs a forged
//! value, transform needs a transform table) happens agent-side.

use serde::{Deserialize, Serialize};

use crate::signature::MethodSignature;

/// Strategy selector for one hook entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Never forward; return the configured forged value.
    Bypass,
    /// Forward unchanged, emitting entry/exit observations.
    #[default]
    Observe,
    /// Observe, plus drive the auxiliary derivation pipeline when the
    /// watched header is present.
    Transform,
}

/// Literal value returned by a bypass hook in place of the original result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForgedValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Settings for the transform-and-forward strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Auxiliary class instantiated fresh per intercepted call.
    pub aux_class: String,
    /// Header name watched on the builder-shaped argument.
    pub header: String,
    /// Method used to read a header value off the builder argument.
    #[serde(default = "default_header_getter")]
    pub header_getter: String,
    /// Aux method that trims/transforms the header value.
    #[serde(default = "default_transform_method")]
    pub transform_method: String,
    /// Aux method that signs/encrypts the rendered payload.
    #[serde(default = "default_encrypt_method")]
    pub encrypt_method: String,
    /// Payload handed to the encrypt method; `{input}` is the primary
    /// string argument, `{salt}` the transformed header value.
    #[serde(default = "default_payload_template")]
    pub payload_template: String,
    /// Substitute the derived value into the forwarded arguments.
    ///
    /// Off by default: the derivation is a best-effort reproduction of the
    /// target's own signing pipeline, and forging arguments breaks the
    /// target's internal consistency whenever the two disagree.
    #[serde(default)]
    pub mutate_forwarded: bool,
}

fn default_header_getter() -> String {
    "get".to_string()
}

fn default_transform_method() -> String {
    "getValues".to_string()
}

fn default_encrypt_method() -> String {
    "encryption".to_string()
}

fn default_payload_template() -> String {
    "REQBODY={input}&SALT={salt}".to_string()
}

/// One entry of the declarative hook list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookSpec {
    /// Fully-qualified target class name.
    pub class: String,
    /// Target method name.
    pub method: String,
    /// Ordered parameter type descriptors selecting one overload.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Required for `bypass`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forged: Option<ForgedValue>,
    /// Required for `transform`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformSpec>,
}

impl HookSpec {
    /// The signature this entry targets.
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(&self.class, &self.method, self.params.iter().cloned())
    }
}
