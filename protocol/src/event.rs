//! Observation events emitted by interceptors.
//!
//! Events are line-oriented: every observation renders to a single text
//! line for the operator's log stream. The serde derives exist so tooling
//! can also consume events in structured form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::truncate;

/// Maximum rendered length of a single field value in a log line.
const MAX_FIELD_LEN: usize = 200;

/// Which side of an intercepted invocation an observation describes.
///
/// Serializes as a lowercase string for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Emitted on entry, before any forwarding decision.
    Entry,
    /// Emitted after the original returned (never for bypassed calls).
    Exit,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Entry => "entry",
            Phase::Exit => "exit",
        }
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "entry" => Ok(Phase::Entry),
            "exit" => Ok(Phase::Exit),
            other => Err(serde::de::Error::custom(format!("unknown phase: {other}"))),
        }
    }
}

/// A single observation from one interceptor invocation.
///
/// Fields keep insertion order so log lines read the way the interceptor
/// recorded them (arguments first, derived values after).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationEvent {
    /// Stable identifier of the emitting hook, e.g. `ApiService.checkResponseHash`.
    pub hook_id: String,
    pub phase: Phase,
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl ObservationEvent {
    pub fn entry(hook_id: impl Into<String>) -> Self {
        Self {
            hook_id: hook_id.into(),
            phase: Phase::Entry,
            fields: Vec::new(),
        }
    }

    pub fn exit(hook_id: impl Into<String>) -> Self {
        Self {
            hook_id: hook_id.into(),
            phase: Phase::Exit,
            fields: Vec::new(),
        }
    }

    /// Append a named field, truncating oversized values for display.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), truncate(&value.into(), MAX_FIELD_LEN)));
        self
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render the event as one log line: `[hook-id] phase k=v k=v`.
    pub fn to_line(&self) -> String {
        let mut line = format!("[{}] {}", self.hook_id, self.phase.as_str());
        for (name, value) in &self.fields {
            line.push(' ');
            line.push_str(name);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}
