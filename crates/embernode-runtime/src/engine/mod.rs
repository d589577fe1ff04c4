// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host engine binding
//!
//! The runtime never owns a JavaScript engine. Everything it needs from
//! one (building values, calling functions, throwing errors, evaluating a
//! module body) goes through [`HostEngine`], which an embedder implements
//! for the engine it already runs.

pub mod args;
#[cfg(feature = "boa")]
pub mod boa;

use crate::error::{Exception, ScriptResult};
use crate::registry::EngineRegistry;
use crate::runtime::RuntimeInstance;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registry mapping engine identities to the runtime that owns them
pub type InstanceRegistry<E> = EngineRegistry<RuntimeInstance<E>>;

/// A native function callable from script code.
///
/// Plain function pointers only: state is recovered from the engine
/// identity through the [`InstanceRegistry`], never captured.
pub type NativeFunction<E> = fn(
    &mut E,
    &<E as HostEngine>::Value,
    &[<E as HostEngine>::Value],
) -> Result<<E as HostEngine>::Value, <E as HostEngine>::Value>;

/// Stable identity of one host engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

impl EngineId {
    /// Identity reported by an engine that was never given one
    pub const DETACHED: Self = Self(0);

    /// Allocate a fresh process-unique identity
    pub fn next() -> Self {
        Self(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Script-visible error constructors the runtime raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `Error`
    Error,
    /// `TypeError`
    TypeError,
    /// `RangeError`
    RangeError,
}

impl ErrorKind {
    /// Constructor name as seen by scripts
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
        }
    }
}

/// Everything the engine needs to evaluate one CommonJS module body
#[derive(Debug, Clone)]
pub struct ModuleScope<V> {
    /// Canonical module identifier
    pub id: String,
    /// Absolute filename (`__filename`)
    pub filename: PathBuf,
    /// Directory of the module (`__dirname`)
    pub dirname: PathBuf,
    /// Module source text
    pub source: String,
    /// The `module` object
    pub module: V,
    /// The initial `module.exports` object
    pub exports: V,
    /// The global `require(id, contextDir)` function.
    ///
    /// Bindings must expose it to the module body as a one-argument
    /// `require` that passes `dirname` as the context.
    pub require: V,
}

/// The embedding boundary to a JavaScript engine
pub trait HostEngine: Sized + 'static {
    /// A script value
    type Value: Clone + fmt::Debug + 'static;

    /// Identity of this engine instance
    fn engine_id(&self) -> EngineId;

    /// The registry this engine was created with
    fn instance_registry(&self) -> Arc<InstanceRegistry<Self>>;

    /// `undefined`
    fn undefined(&self) -> Self::Value;

    /// The global object
    fn global_object(&mut self) -> Self::Value;

    /// Whether `value` is `undefined`
    fn is_undefined(&self, value: &Self::Value) -> bool;

    /// Whether `value` can be called
    fn is_callable(&self, value: &Self::Value) -> bool;

    /// The number held by `value`, if it is a number
    fn as_number(&self, value: &Self::Value) -> Option<f64>;

    /// The string held by `value`, if it is a string
    fn as_string(&self, value: &Self::Value) -> Option<String>;

    /// Truthiness, as `Boolean(value)` would compute it
    fn to_boolean(&self, value: &Self::Value) -> bool;

    /// Render any value the way `String(value)` would
    fn display(&mut self, value: &Self::Value) -> String;

    /// Make a number
    fn number(&mut self, value: f64) -> Self::Value;

    /// Make a boolean
    fn boolean(&mut self, value: bool) -> Self::Value;

    /// Make a string
    fn string(&mut self, value: &str) -> Self::Value;

    /// Make an empty plain object
    fn new_object(&mut self) -> Self::Value;

    /// Make an array holding `items`
    fn new_array(&mut self, items: Vec<Self::Value>) -> Self::Value;

    /// Wrap a native function
    fn new_function(&mut self, name: &str, arity: usize, function: NativeFunction<Self>)
    -> Self::Value;

    /// Read a property
    fn get_property(&mut self, object: &Self::Value, name: &str) -> Result<Self::Value, Self::Value>;

    /// Define or overwrite a property
    fn set_property(
        &mut self,
        object: &Self::Value,
        name: &str,
        value: Self::Value,
    ) -> Result<(), Self::Value>;

    /// Make an error object of the given kind
    fn new_error(&mut self, kind: ErrorKind, message: &str) -> Self::Value;

    /// Call `callee` with `this` bound to `this`
    fn call(
        &mut self,
        callee: &Self::Value,
        this: &Self::Value,
        args: &[Self::Value],
    ) -> Result<Self::Value, Self::Value>;

    /// Evaluate a module body in a fresh function scope
    fn evaluate_module(&mut self, scope: &ModuleScope<Self::Value>) -> Result<(), Self::Value>;

    /// Drain engine-level jobs (promise reactions) after a callback ran
    fn run_microtasks(&mut self) {}
}

/// Finish a native function: runtime errors become thrown engine values
pub fn settle<E: HostEngine>(
    engine: &mut E,
    result: ScriptResult<E::Value, E::Value>,
) -> Result<E::Value, E::Value> {
    result.map_err(|err| err.into_value(engine))
}

/// Set `object[name] = value`
pub fn define_value<E: HostEngine>(
    engine: &mut E,
    object: &E::Value,
    name: &str,
    value: E::Value,
) -> ScriptResult<(), E::Value> {
    engine
        .set_property(object, name, value)
        .map_err(Exception::Thrown)
}

/// Set `object[name]` to a native function
pub fn define_function<E: HostEngine>(
    engine: &mut E,
    object: &E::Value,
    name: &str,
    arity: usize,
    function: NativeFunction<E>,
) -> ScriptResult<(), E::Value> {
    let value = engine.new_function(name, arity, function);
    define_value(engine, object, name, value)
}
