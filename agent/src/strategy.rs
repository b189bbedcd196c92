//! Interceptor strategies: bypass, observe-and-forward, transform-and-forward.
//!
//! A strategy is compiled once per hook into a `Replacement` closure. Per
//! invocation the closure moves Entered -> {Bypassed | Forwarded} ->
//! Returned: bypass short-circuits with the forged value and never runs
//! the original; observe forwards unmodified and only adds entry/exit
//! observations; transform additionally runs the derivation pipeline when
//! the watched header is present. Forwarding failures propagate to the
//! caller unchanged; derivation failures degrade to log-and-continue.

use std::sync::Arc;

use log::warn;
use tapwire_intercept::bridge::{Invocation, Replacement, Runtime};
use tapwire_intercept::value::Value;
use tapwire_protocol::{HookSpec, ObservationEvent, StrategyKind, TransformSpec};

use crate::config::ConfigError;
use crate::pipeline;
use crate::sink::ObservationSink;

/// Behavior of one installed hook.
#[derive(Debug)]
pub enum Strategy {
    /// Never forward; return the forged value.
    Bypass { forged: Value },
    /// Forward unmodified; externally the target behaves as un-hooked.
    Observe,
    /// Observe, plus the auxiliary derivation pipeline.
    Transform(TransformSpec),
}

impl Strategy {
    /// Build from a declarative hook entry, validating the strategy's
    /// required settings.
    pub fn from_spec(spec: &HookSpec) -> Result<Self, ConfigError> {
        match spec.strategy {
            StrategyKind::Bypass => match &spec.forged {
                Some(forged) => Ok(Strategy::Bypass {
                    forged: Value::from(forged),
                }),
                None => Err(ConfigError::MissingForgedValue(spec.signature())),
            },
            StrategyKind::Observe => Ok(Strategy::Observe),
            StrategyKind::Transform => match &spec.transform {
                Some(transform) => Ok(Strategy::Transform(transform.clone())),
                None => Err(ConfigError::MissingTransform(spec.signature())),
            },
        }
    }
}

/// Compile a strategy into the replacement closure installed by the
/// registry. `hook_id` tags every observation the closure emits.
pub fn build_interceptor(
    hook_id: String,
    strategy: Strategy,
    runtime: Arc<dyn Runtime>,
    sink: Arc<dyn ObservationSink>,
) -> Replacement {
    Arc::new(move |inv| match &strategy {
        Strategy::Bypass { forged } => {
            sink.emit(&entry_event(&hook_id, inv).field("forged", forged.preview()));
            Ok(forged.clone())
        }
        Strategy::Observe => {
            sink.emit(&entry_event(&hook_id, inv));
            let result = inv.forward()?;
            sink.emit(&exit_event(&hook_id, &result));
            Ok(result)
        }
        Strategy::Transform(spec) => {
            sink.emit(&entry_event(&hook_id, inv));

            let mut substituted: Option<Vec<Value>> = None;
            if let Some(token) = watched_header(inv, spec, &hook_id) {
                match pipeline::derive_value(runtime.as_ref(), spec, primary_input(inv), &token) {
                    Ok(derived) => {
                        sink.emit(
                            &ObservationEvent::entry(&hook_id)
                                .field("header", &spec.header)
                                .field("derived", derived.preview()),
                        );
                        if spec.mutate_forwarded {
                            substituted = substitute_primary(inv.args(), &derived, &hook_id);
                        }
                    }
                    Err(e) => warn!("derivation failed for {}: {}", hook_id, e),
                }
            }

            let result = match &substituted {
                Some(args) => inv.forward_with(args)?,
                None => inv.forward()?,
            };
            sink.emit(&exit_event(&hook_id, &result));
            Ok(result)
        }
    })
}

fn entry_event(hook_id: &str, inv: &Invocation<'_>) -> ObservationEvent {
    let mut event = ObservationEvent::entry(hook_id);
    for (i, arg) in inv.args().iter().enumerate() {
        event = event.field(format!("arg{i}"), arg.preview());
    }
    event
}

fn exit_event(hook_id: &str, result: &Value) -> ObservationEvent {
    ObservationEvent::exit(hook_id).field("result", result.preview())
}

/// Read the watched header off the first object-shaped argument.
/// Any failure here counts as "header absent" — the hook keeps forwarding.
fn watched_header(inv: &Invocation<'_>, spec: &TransformSpec, hook_id: &str) -> Option<String> {
    let builder = inv.args().iter().find_map(Value::as_instance)?;
    match builder.call(&spec.header_getter, &[Value::from(spec.header.as_str())]) {
        Ok(Value::Str(token)) => Some(token),
        Ok(_) => None,
        Err(e) => {
            warn!("reading header {} failed for {}: {}", spec.header, hook_id, e);
            None
        }
    }
}

/// The primary string input of the intercepted call (first string argument).
fn primary_input<'a>(inv: &'a Invocation<'_>) -> &'a str {
    inv.args()
        .iter()
        .find_map(Value::as_str)
        .unwrap_or_default()
}

/// Replace the primary string argument with the derived value. Explicit
/// mutation opt-in only; a non-string derivation cannot be substituted.
fn substitute_primary(args: &[Value], derived: &Value, hook_id: &str) -> Option<Vec<Value>> {
    if derived.as_str().is_none() {
        warn!(
            "cannot substitute non-string derived value into {}",
            hook_id
        );
        return None;
    }
    let mut out = args.to_vec();
    let slot = out.iter_mut().find(|v| v.as_str().is_some())?;
    *slot = derived.clone();
    Some(out)
}
