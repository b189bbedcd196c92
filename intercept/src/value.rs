//! Runtime value model.
//!
//! Values crossing the bridge are a small tagged set: the scalar shapes the
//! hooked signatures actually traffic in, plus opaque object handles for
//! everything else (builders, helper instances).

use std::fmt;
use std::sync::Arc;

use tapwire_protocol::format::truncate;
use tapwire_protocol::ForgedValue;

use crate::error::InvokeError;

/// Maximum preview length for observation fields.
const PREVIEW_LEN: usize = 120;

/// Shared handle to a live object in the bridged runtime.
pub type InstanceRef = Arc<dyn Instance>;

/// A live object handle. Calls dispatch through the runtime's current
/// method table, so an instance call on a hooked method still hits the
/// installed interceptor.
pub trait Instance: Send + Sync {
    /// Class name of the underlying object.
    fn class_name(&self) -> &str;
    /// Invoke a method on this object by name.
    fn call(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError>;
}

/// A value passed into or out of an intercepted method.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Instance(InstanceRef),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Instance(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short display form for observation fields. Strings are truncated;
    /// objects render as their class name.
    pub fn preview(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Str(s) => truncate(s, PREVIEW_LEN),
            Value::Instance(obj) => format!("<{}>", obj.class_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Instance(obj) => write!(f, "Instance(<{}>)", obj.class_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Object identity, not structural equality.
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&ForgedValue> for Value {
    fn from(forged: &ForgedValue) -> Self {
        match forged {
            ForgedValue::Bool(b) => Value::Bool(*b),
            ForgedValue::Int(i) => Value::Int(*i),
            ForgedValue::Str(s) => Value::Str(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    impl Instance for Dummy {
        fn class_name(&self) -> &str {
            "com.example.Dummy"
        }

        fn call(&self, _method: &str, _args: &[Value]) -> Result<Value, InvokeError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_preview_shapes() {
        assert_eq!(Value::Null.preview(), "null");
        assert_eq!(Value::Bool(true).preview(), "true");
        assert_eq!(Value::Int(-3).preview(), "-3");
        assert_eq!(Value::from("abc").preview(), "abc");
        let obj = Value::Instance(Arc::new(Dummy));
        assert_eq!(obj.preview(), "<com.example.Dummy>");
    }

    #[test]
    fn test_preview_truncates_long_strings() {
        let long = "a".repeat(300);
        let preview = Value::from(long).preview();
        assert!(preview.len() <= 120);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_instance_equality_is_identity() {
        let a: InstanceRef = Arc::new(Dummy);
        let b: InstanceRef = Arc::new(Dummy);
        assert_eq!(Value::Instance(a.clone()), Value::Instance(a.clone()));
        assert_ne!(Value::Instance(a), Value::Instance(b));
    }

    #[test]
    fn test_forged_value_conversion() {
        assert_eq!(Value::from(&ForgedValue::Bool(true)), Value::Bool(true));
        assert_eq!(Value::from(&ForgedValue::Int(7)), Value::Int(7));
        assert_eq!(
            Value::from(&ForgedValue::Str("x".to_string())),
            Value::Str("x".to_string())
        );
    }
}
