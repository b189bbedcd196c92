//! In-memory reference runtime.
//!
//! A scriptable `Runtime` implementation: classes are registered with
//! method bodies written as Rust closures, and every method counts how
//! often its original body actually ran. The test-suite uses it as the
//! bridged "target process" — the counters are what let tests prove a
//! bypassed method never executed its real logic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::bridge::{Class, Invocation, Method, Replacement, Runtime};
use crate::error::{HookError, InvokeError, ResolutionError};
use crate::value::{Instance, Value};

type MethodBody = Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;
type CtorBody = Arc<dyn Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// Scriptable runtime holding registered classes by name.
#[derive(Default)]
pub struct MemoryRuntime {
    classes: Mutex<HashMap<String, Arc<MemoryClass>>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returning the handle so tests can reach its
    /// method counters directly.
    pub fn register(&self, builder: ClassBuilder) -> Arc<MemoryClass> {
        let class = builder.build();
        self.classes
            .lock()
            .unwrap()
            .insert(class.name.clone(), Arc::clone(&class));
        class
    }
}

impl Runtime for MemoryRuntime {
    fn lookup_class(&self, name: &str) -> Result<Arc<dyn Class>, ResolutionError> {
        self.classes
            .lock()
            .unwrap()
            .get(name)
            .map(|c| Arc::clone(c) as Arc<dyn Class>)
            .ok_or_else(|| ResolutionError::ClassNotFound(name.to_string()))
    }
}

/// Builder for a scripted class.
pub struct ClassBuilder {
    name: String,
    methods: Vec<(String, Vec<String>, MethodBody)>,
    constructor: Option<CtorBody>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            constructor: None,
        }
    }

    /// Add a method overload with the given parameter types and body.
    pub fn method<F>(mut self, name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.methods.push((
            name.to_string(),
            params.iter().map(|p| p.to_string()).collect(),
            Arc::new(body),
        ));
        self
    }

    /// Override construction. Without this, `construct` yields a plain
    /// instance whose calls dispatch to the class's scripted methods.
    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(body));
        self
    }

    fn build(self) -> Arc<MemoryClass> {
        Arc::new_cyclic(|weak: &Weak<MemoryClass>| {
            let methods = self
                .methods
                .into_iter()
                .map(|(name, params, body)| {
                    Arc::new(MemoryMethod {
                        class_name: self.name.clone(),
                        name,
                        params,
                        body,
                        replacement: Mutex::new(None),
                        original_calls: AtomicUsize::new(0),
                    })
                })
                .collect();
            MemoryClass {
                name: self.name,
                methods,
                constructor: self.constructor,
                self_ref: weak.clone(),
            }
        })
    }
}

/// A scripted class.
pub struct MemoryClass {
    name: String,
    methods: Vec<Arc<MemoryMethod>>,
    constructor: Option<CtorBody>,
    self_ref: Weak<MemoryClass>,
}

impl MemoryClass {
    /// Look up a concrete overload; tests use this to reach the call
    /// counter and to invoke hooked methods the way target code would.
    pub fn find(&self, method: &str, params: &[&str]) -> Option<Arc<MemoryMethod>> {
        self.methods
            .iter()
            .find(|m| m.name == method && m.params.iter().map(String::as_str).eq(params.iter().copied()))
            .map(Arc::clone)
    }
}

impl Class for MemoryClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn overloads(&self, method: &str) -> Vec<Arc<dyn Method>> {
        self.methods
            .iter()
            .filter(|m| m.name == method)
            .map(|m| Arc::clone(m) as Arc<dyn Method>)
            .collect()
    }

    fn construct(&self, args: &[Value]) -> Result<Value, InvokeError> {
        if let Some(ctor) = &self.constructor {
            return ctor(args);
        }
        let class = self
            .self_ref
            .upgrade()
            .ok_or_else(|| InvokeError::new(&self.name, "class unregistered"))?;
        let instance = Arc::new_cyclic(|weak: &Weak<MemoryInstance>| MemoryInstance {
            class,
            self_ref: weak.clone(),
        });
        Ok(Value::Instance(instance))
    }
}

/// Default instance shape: dispatches calls to the class's scripted
/// methods by name and arity. Dispatch goes through `Method::invoke`, so
/// an instance call on a hooked method still hits the interceptor —
/// that is what makes cross-hook composition observable in tests.
struct MemoryInstance {
    class: Arc<MemoryClass>,
    self_ref: Weak<MemoryInstance>,
}

impl Instance for MemoryInstance {
    fn class_name(&self) -> &str {
        &self.class.name
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let receiver = self
            .self_ref
            .upgrade()
            .map(|me| Value::Instance(me as Arc<dyn Instance>));
        let target = self
            .class
            .methods
            .iter()
            .find(|m| m.name == method && m.params.len() == args.len())
            .ok_or_else(|| {
                InvokeError::new(
                    format!("{}.{}", self.class.name, method),
                    format!("no overload with {} argument(s)", args.len()),
                )
            })?;
        target.invoke(receiver.as_ref(), args)
    }
}

/// A scripted method overload with replacement support and an
/// original-body call counter.
pub struct MemoryMethod {
    class_name: String,
    name: String,
    params: Vec<String>,
    body: MethodBody,
    replacement: Mutex<Option<Replacement>>,
    original_calls: AtomicUsize,
}

impl MemoryMethod {
    /// How many times the original body has executed (replacement
    /// invocations do not count unless they forward).
    pub fn original_calls(&self) -> usize {
        self.original_calls.load(Ordering::SeqCst)
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.name)
    }
}

impl Method for MemoryMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_types(&self) -> &[String] {
        &self.params
    }

    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError> {
        // Clone the handle out of the lock: the replacement itself may
        // forward back into invoke_original on this same method.
        let replacement = self.replacement.lock().unwrap().clone();
        match replacement {
            Some(replacement) => replacement(&Invocation::new(receiver, args, self)),
            None => self.invoke_original(receiver, args),
        }
    }

    fn invoke_original(
        &self,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        self.original_calls.fetch_add(1, Ordering::SeqCst);
        (self.body)(receiver, args)
    }

    fn replace(&self, replacement: Replacement) -> Result<(), HookError> {
        let mut slot = self.replacement.lock().unwrap();
        if slot.is_some() {
            return Err(HookError::AlreadyReplaced(self.qualified_name()));
        }
        *slot = Some(replacement);
        Ok(())
    }

    fn restore(&self) -> Result<(), HookError> {
        self.replacement
            .lock()
            .unwrap()
            .take()
            .map(|_| ())
            .ok_or_else(|| HookError::NotReplaced(self.qualified_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_class(runtime: &MemoryRuntime) -> Arc<MemoryClass> {
        runtime.register(ClassBuilder::new("com.example.Text").method(
            "upper",
            &["java.lang.String"],
            |_, args| {
                let s = args[0].as_str().unwrap_or_default();
                Ok(Value::from(s.to_uppercase()))
            },
        ))
    }

    #[test]
    fn test_original_body_counts_calls() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();

        assert_eq!(method.original_calls(), 0);
        let out = method.invoke(None, &[Value::from("abc")]).unwrap();
        assert_eq!(out, Value::from("ABC"));
        assert_eq!(method.original_calls(), 1);
    }

    #[test]
    fn test_replacement_intercepts_and_can_forward() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();

        let replacement: Replacement = Arc::new(|inv| {
            let real = inv.forward()?;
            Ok(Value::from(format!("{}!", real.as_str().unwrap_or_default())))
        });
        method.replace(replacement).unwrap();

        let out = method.invoke(None, &[Value::from("abc")]).unwrap();
        assert_eq!(out, Value::from("ABC!"));
        assert_eq!(method.original_calls(), 1);

        method.restore().unwrap();
        let out = method.invoke(None, &[Value::from("abc")]).unwrap();
        assert_eq!(out, Value::from("ABC"));
        assert_eq!(method.original_calls(), 2);
    }

    #[test]
    fn test_replacement_can_skip_original() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();

        method
            .replace(Arc::new(|_| Ok(Value::from("forged"))))
            .unwrap();
        let out = method.invoke(None, &[Value::from("abc")]).unwrap();
        assert_eq!(out, Value::from("forged"));
        assert_eq!(method.original_calls(), 0);
    }

    #[test]
    fn test_double_replace_rejected() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();

        method.replace(Arc::new(|inv| inv.forward())).unwrap();
        let err = method.replace(Arc::new(|inv| inv.forward())).unwrap_err();
        assert_eq!(
            err,
            HookError::AlreadyReplaced("com.example.Text.upper".to_string())
        );
    }

    #[test]
    fn test_restore_without_replacement_fails() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();
        assert!(matches!(
            method.restore().unwrap_err(),
            HookError::NotReplaced(_)
        ));
    }

    #[test]
    fn test_default_instance_dispatches_by_name_and_arity() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);

        let instance = class.construct(&[]).unwrap();
        let obj = instance.as_instance().unwrap();
        let out = obj.call("upper", &[Value::from("hi")]).unwrap();
        assert_eq!(out, Value::from("HI"));

        let err = obj.call("missing", &[]).unwrap_err();
        assert!(err.message.contains("no overload"));
    }

    #[test]
    fn test_instance_call_routes_through_replacement() {
        let runtime = MemoryRuntime::new();
        let class = upper_class(&runtime);
        let method = class.find("upper", &["java.lang.String"]).unwrap();
        method
            .replace(Arc::new(|_| Ok(Value::from("hooked"))))
            .unwrap();

        let instance = class.construct(&[]).unwrap();
        let obj = instance.as_instance().unwrap();
        let out = obj.call("upper", &[Value::from("hi")]).unwrap();
        assert_eq!(out, Value::from("hooked"));
        assert_eq!(method.original_calls(), 0);
    }

    #[test]
    fn test_custom_constructor() {
        let runtime = MemoryRuntime::new();
        runtime.register(
            ClassBuilder::new("com.example.Strict")
                .constructor(|args| {
                    if args.is_empty() {
                        Err(InvokeError::new("com.example.Strict", "seed required"))
                    } else {
                        Ok(args[0].clone())
                    }
                }),
        );
        let class = runtime.lookup_class("com.example.Strict").unwrap();
        assert!(class.construct(&[]).is_err());
        assert_eq!(class.construct(&[Value::Int(1)]).unwrap(), Value::Int(1));
    }
}
