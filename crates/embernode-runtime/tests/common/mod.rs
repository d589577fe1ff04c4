// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! In-memory host engine for integration tests
//!
//! Module "source" is a key into a table of Rust functions standing in for
//! module bodies, and script callbacks are Rust closures.

#![allow(dead_code)]

use embernode_runtime::engine::{
    EngineId, ErrorKind, HostEngine, InstanceRegistry, ModuleScope, NativeFunction,
};
use embernode_runtime::module_system::{ModuleResolver, ResolvedModule, is_path_specifier};
use embernode_runtime::modules::path;
use embernode_runtime::{NodeError, Result, Runtime, RuntimeConfig};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Directory top-level specifiers resolve against
pub const APP_DIR: &str = "/app";

/// A Rust function standing in for a module body
pub type ModuleBody = fn(&mut MockEngine, &ModuleScope<Value>) -> std::result::Result<(), Value>;

type Callback = Rc<dyn Fn(&mut MockEngine, &Value, &[Value]) -> std::result::Result<Value, Value>>;

/// A mock script value
#[derive(Clone)]
pub enum Value {
    Undefined,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Rc<RefCell<Object>>),
}

impl Value {
    /// Reference identity for objects, value equality otherwise
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn object(kind: ObjectKind) -> Value {
        Value::Object(Rc::new(RefCell::new(Object {
            properties: BTreeMap::new(),
            kind,
        })))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(object) => match &object.borrow().kind {
                ObjectKind::Plain => f.write_str("[object]"),
                ObjectKind::Array(items) => write!(f, "[array; {}]", items.len()),
                ObjectKind::Native(_) | ObjectKind::Script(_) => f.write_str("[function]"),
                ObjectKind::Error(kind) => write!(f, "[{}]", kind.name()),
            },
        }
    }
}

/// A mock object
pub struct Object {
    pub properties: BTreeMap<String, Value>,
    pub kind: ObjectKind,
}

/// What an object is underneath its properties
pub enum ObjectKind {
    Plain,
    Array(Vec<Value>),
    Native(NativeFunction<MockEngine>),
    Script(Callback),
    Error(ErrorKind),
}

/// The mock engine
pub struct MockEngine {
    id: EngineId,
    registry: Arc<InstanceRegistry<MockEngine>>,
    global: Value,
    bodies: HashMap<String, ModuleBody>,
    /// Free-form record tests append to from callbacks and module bodies
    pub log: Rc<RefCell<Vec<String>>>,
    /// How many times the runtime drained microtasks
    pub microtask_drains: usize,
}

impl MockEngine {
    pub fn new(registry: Arc<InstanceRegistry<MockEngine>>) -> Self {
        Self {
            id: EngineId::next(),
            registry,
            global: Value::object(ObjectKind::Plain),
            bodies: HashMap::new(),
            log: Rc::new(RefCell::new(Vec::new())),
            microtask_drains: 0,
        }
    }

    /// Make `source` evaluate by running `body`
    pub fn define_body(&mut self, source: &str, body: ModuleBody) {
        self.bodies.insert(source.to_string(), body);
    }

    /// A script function backed by a closure
    pub fn callback(
        &mut self,
        f: impl Fn(&mut MockEngine, &Value, &[Value]) -> std::result::Result<Value, Value> + 'static,
    ) -> Value {
        Value::object(ObjectKind::Script(Rc::new(f)))
    }

    /// A callback that appends `entry` to the log
    pub fn logger(&mut self, entry: &str) -> Value {
        let entry = entry.to_string();
        self.callback(move |engine, _this, _args| {
            engine.log.borrow_mut().push(entry.clone());
            Ok(Value::Undefined)
        })
    }

    /// Snapshot of the log
    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Call `global[name](...args)`
    pub fn call_global(&mut self, name: &str, args: &[Value]) -> std::result::Result<Value, Value> {
        let global = self.global.clone();
        let function = self.get_property(&global, name)?;
        self.call(&function, &global, args)
    }

    /// Call `object[name](...args)`
    pub fn call_method(
        &mut self,
        object: &Value,
        name: &str,
        args: &[Value],
    ) -> std::result::Result<Value, Value> {
        let function = self.get_property(object, name)?;
        self.call(&function, object, args)
    }

    /// Call `global[object][name](...args)`
    pub fn call_global_method(
        &mut self,
        object: &str,
        name: &str,
        args: &[Value],
    ) -> std::result::Result<Value, Value> {
        let global = self.global.clone();
        let object = self.get_property(&global, object)?;
        self.call_method(&object, name, args)
    }

    /// Property access that panics on failure
    pub fn prop(&mut self, object: &Value, name: &str) -> Value {
        self.get_property(object, name).expect("property read failed")
    }

    /// The `name` property of an error value
    pub fn error_name(&mut self, value: &Value) -> Option<String> {
        match value {
            Value::Object(object) => match object.borrow().kind {
                ObjectKind::Error(kind) => Some(kind.name().to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    /// `require(id, dirname)` from inside a module body
    pub fn require_in(
        &mut self,
        scope: &ModuleScope<Value>,
        id: &str,
    ) -> std::result::Result<Value, Value> {
        let id = self.string(id);
        let dirname = self.string(&scope.dirname.to_string_lossy());
        self.call(&scope.require, &Value::Undefined, &[id, dirname])
    }
}

impl HostEngine for MockEngine {
    type Value = Value;

    fn engine_id(&self) -> EngineId {
        self.id
    }

    fn instance_registry(&self) -> Arc<InstanceRegistry<Self>> {
        Arc::clone(&self.registry)
    }

    fn undefined(&self) -> Value {
        Value::Undefined
    }

    fn global_object(&mut self) -> Value {
        self.global.clone()
    }

    fn is_undefined(&self, value: &Value) -> bool {
        matches!(value, Value::Undefined)
    }

    fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Object(object) => matches!(
                object.borrow().kind,
                ObjectKind::Native(_) | ObjectKind::Script(_)
            ),
            _ => false,
        }
    }

    fn as_number(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_string(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.to_string()),
            _ => None,
        }
    }

    fn to_boolean(&self, value: &Value) -> bool {
        match value {
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    fn display(&mut self, value: &Value) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => embernode_runtime::modules::util::number_to_string(*n),
            Value::String(s) => s.to_string(),
            Value::Object(object) => {
                let items = match &object.borrow().kind {
                    ObjectKind::Array(items) => items.clone(),
                    ObjectKind::Error(kind) => {
                        let message = match object.borrow().properties.get("message") {
                            Some(Value::String(s)) => s.to_string(),
                            _ => String::new(),
                        };
                        return format!("{}: {}", kind.name(), message);
                    }
                    ObjectKind::Native(_) | ObjectKind::Script(_) => return "function".to_string(),
                    ObjectKind::Plain => return "[object Object]".to_string(),
                };
                items
                    .iter()
                    .map(|item| self.display(item))
                    .collect::<Vec<_>>()
                    .join(",")
            }
        }
    }

    fn number(&mut self, value: f64) -> Value {
        Value::Number(value)
    }

    fn boolean(&mut self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn string(&mut self, value: &str) -> Value {
        Value::String(Rc::from(value))
    }

    fn new_object(&mut self) -> Value {
        Value::object(ObjectKind::Plain)
    }

    fn new_array(&mut self, items: Vec<Value>) -> Value {
        Value::object(ObjectKind::Array(items))
    }

    fn new_function(&mut self, _name: &str, _arity: usize, function: NativeFunction<Self>) -> Value {
        Value::object(ObjectKind::Native(function))
    }

    fn get_property(&mut self, object: &Value, name: &str) -> std::result::Result<Value, Value> {
        match object {
            Value::Object(object) => {
                let object = object.borrow();
                if let (ObjectKind::Array(items), "length") = (&object.kind, name) {
                    return Ok(Value::Number(items.len() as f64));
                }
                if let (ObjectKind::Array(items), Ok(index)) = (&object.kind, name.parse::<usize>()) {
                    return Ok(items.get(index).cloned().unwrap_or(Value::Undefined));
                }
                Ok(object.properties.get(name).cloned().unwrap_or(Value::Undefined))
            }
            Value::Undefined => Err(self.new_error(
                ErrorKind::TypeError,
                &format!("Cannot read properties of undefined (reading '{name}')"),
            )),
            _ => Ok(Value::Undefined),
        }
    }

    fn set_property(&mut self, object: &Value, name: &str, value: Value) -> std::result::Result<(), Value> {
        match object {
            Value::Object(object) => {
                object.borrow_mut().properties.insert(name.to_string(), value);
                Ok(())
            }
            _ => Err(self.new_error(
                ErrorKind::TypeError,
                &format!("Cannot set property '{name}' on a primitive"),
            )),
        }
    }

    fn new_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        let error = Value::object(ObjectKind::Error(kind));
        if let Value::Object(object) = &error {
            let mut object = object.borrow_mut();
            object
                .properties
                .insert("message".to_string(), Value::String(Rc::from(message)));
            object
                .properties
                .insert("name".to_string(), Value::String(Rc::from(kind.name())));
        }
        error
    }

    fn call(&mut self, callee: &Value, this: &Value, args: &[Value]) -> std::result::Result<Value, Value> {
        enum Target {
            Native(NativeFunction<MockEngine>),
            Script(Callback),
        }

        let target = match callee {
            Value::Object(object) => match &object.borrow().kind {
                ObjectKind::Native(function) => Some(Target::Native(*function)),
                ObjectKind::Script(callback) => Some(Target::Script(Rc::clone(callback))),
                _ => None,
            },
            _ => None,
        };

        match target {
            Some(Target::Native(function)) => function(self, this, args),
            Some(Target::Script(callback)) => callback(self, this, args),
            None => Err(self.new_error(ErrorKind::TypeError, "value is not a function")),
        }
    }

    fn run_microtasks(&mut self) {
        self.microtask_drains += 1;
    }

    fn evaluate_module(&mut self, scope: &ModuleScope<Value>) -> std::result::Result<(), Value> {
        match self.bodies.get(&scope.source).copied() {
            Some(body) => body(self, scope),
            None => Err(self.new_error(
                ErrorKind::Error,
                &format!("no module body for source '{}'", scope.source),
            )),
        }
    }
}

/// Resolver over an in-memory file table: absolute filename -> source
#[derive(Debug, Default, Clone)]
pub struct MapResolver {
    files: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; `filename` is absolute
    pub fn file(mut self, filename: &str, source: &str) -> Self {
        self.files.insert(filename.to_string(), source.to_string());
        self
    }
}

impl ModuleResolver for MapResolver {
    fn resolve(&self, specifier: &str, context_dir: Option<&Path>) -> Result<ResolvedModule> {
        if !is_path_specifier(specifier) {
            return Err(NodeError::module_not_found(specifier));
        }
        let dir = context_dir
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| APP_DIR.to_string());
        let filename = path::resolve_from(&dir, &[specifier]);
        match self.files.get(&filename) {
            Some(source) => Ok(ResolvedModule {
                id: filename.clone(),
                filename: PathBuf::from(&filename),
                source: source.clone(),
            }),
            None => Err(NodeError::module_not_found(specifier)),
        }
    }
}

/// An engine attached to a fresh runtime over `resolver`
pub fn runtime_with(
    registry: &Arc<InstanceRegistry<MockEngine>>,
    resolver: MapResolver,
    config: RuntimeConfig,
) -> (MockEngine, Runtime<MockEngine>) {
    let mut engine = MockEngine::new(Arc::clone(registry));
    let runtime = Runtime::with_resolver(&mut engine, config, Box::new(resolver))
        .expect("runtime attaches");
    (engine, runtime)
}

/// An engine and runtime with no user modules
pub fn bare_runtime() -> (MockEngine, Runtime<MockEngine>) {
    runtime_with(&InstanceRegistry::shared(), MapResolver::new(), RuntimeConfig::default())
}
