//! Cross-hook data pipeline: drive an auxiliary class as a read-only oracle.
//!
//! A transform interceptor that sees its watched header reproduces the
//! target's own signing steps through the auxiliary class: trim the token,
//! render the payload, encrypt. The aux class is instantiated fresh per
//! call — that matches the target's own call pattern and rules out hidden
//! instance-state interactions between invocations. The derived value is
//! observational; it never reaches the forwarded call unless the mutation
//! opt-in is set.

use tapwire_intercept::bridge::Runtime;
use tapwire_intercept::error::DerivationError;
use tapwire_intercept::value::Value;
use tapwire_protocol::TransformSpec;

/// Derive a value from the primary input and the watched header token.
///
/// `{input}` in the payload template is the primary string argument of the
/// intercepted call; `{salt}` is the aux-transformed token.
pub fn derive_value(
    runtime: &dyn Runtime,
    spec: &TransformSpec,
    primary: &str,
    token: &str,
) -> Result<Value, DerivationError> {
    let aux = runtime.lookup_class(&spec.aux_class)?;

    // Fresh instance per call, no caching.
    let instance = aux.construct(&[])?;
    let Some(obj) = instance.as_instance() else {
        return Err(DerivationError::NotAnObject(spec.aux_class.clone()));
    };

    let trimmed = obj.call(&spec.transform_method, &[Value::from(token)])?;
    let salt = trimmed.as_str().unwrap_or_default();

    let payload = render_template(&spec.payload_template, primary, salt);
    let derived = obj.call(&spec.encrypt_method, &[Value::Str(payload)])?;
    Ok(derived)
}

fn render_template(template: &str, input: &str, salt: &str) -> String {
    template.replace("{input}", input).replace("{salt}", salt)
}
