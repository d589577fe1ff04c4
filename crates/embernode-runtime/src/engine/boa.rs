// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! [`HostEngine`] binding for the Boa engine
//!
//! The engine identity and its registry live in the realm's host-defined
//! slot, so a `Context` only becomes usable after [`attach`] (or
//! [`new_context`]) has stored them there.

use super::{EngineId, ErrorKind, HostEngine, InstanceRegistry, ModuleScope, NativeFunction};
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::object::builtins::JsArray;
use boa_engine::{
    Context, JsData, JsError, JsNativeError, JsObject, JsString, JsValue, Source,
    NativeFunction as BoaNativeFunction,
};
use boa_gc::{Finalize, Trace};
use std::sync::Arc;

/// Adapts a module's view of `require` to the two-argument global one
const BIND_REQUIRE: &str = "(function (load, dirname) {\n\
    function require(id) { return load(id, dirname); }\n\
    require.resolve = function (id) { return load.resolve(id, dirname); };\n\
    return require;\n\
})";

#[derive(Trace, Finalize, JsData)]
struct HostData {
    #[unsafe_ignore_trace]
    engine_id: EngineId,
    #[unsafe_ignore_trace]
    registry: Arc<InstanceRegistry<Context>>,
}

/// Give `context` a fresh engine identity tied to `registry`
pub fn attach(context: &mut Context, registry: Arc<InstanceRegistry<Context>>) -> EngineId {
    let engine_id = EngineId::next();
    context
        .realm()
        .host_defined_mut()
        .insert(HostData { engine_id, registry });
    tracing::debug!(engine = %engine_id, "attached boa context");
    engine_id
}

/// A default `Context`, already attached to `registry`
pub fn new_context(registry: Arc<InstanceRegistry<Context>>) -> Context {
    let mut context = Context::default();
    attach(&mut context, registry);
    context
}

fn thrown(context: &mut Context, err: JsError) -> JsValue {
    err.to_opaque(context)
}

impl HostEngine for Context {
    type Value = JsValue;

    fn engine_id(&self) -> EngineId {
        self.realm()
            .host_defined()
            .get::<HostData>()
            .map_or(EngineId::DETACHED, |data| data.engine_id)
    }

    fn instance_registry(&self) -> Arc<InstanceRegistry<Self>> {
        self.realm()
            .host_defined()
            .get::<HostData>()
            .map_or_else(InstanceRegistry::<Context>::shared, |data| data.registry.clone())
    }

    fn undefined(&self) -> JsValue {
        JsValue::undefined()
    }

    fn global_object(&mut self) -> JsValue {
        JsValue::from(Context::global_object(self))
    }

    fn is_undefined(&self, value: &JsValue) -> bool {
        value.is_undefined()
    }

    fn is_callable(&self, value: &JsValue) -> bool {
        value.is_callable()
    }

    fn as_number(&self, value: &JsValue) -> Option<f64> {
        value.as_number()
    }

    fn as_string(&self, value: &JsValue) -> Option<String> {
        value.as_string().map(|s| s.to_std_string_escaped())
    }

    fn to_boolean(&self, value: &JsValue) -> bool {
        value.to_boolean()
    }

    fn display(&mut self, value: &JsValue) -> String {
        match value.to_string(self) {
            Ok(s) => s.to_std_string_escaped(),
            Err(_) => value.display().to_string(),
        }
    }

    fn number(&mut self, value: f64) -> JsValue {
        JsValue::from(value)
    }

    fn boolean(&mut self, value: bool) -> JsValue {
        JsValue::from(value)
    }

    fn string(&mut self, value: &str) -> JsValue {
        JsValue::from(JsString::from(value))
    }

    fn new_object(&mut self) -> JsValue {
        JsValue::from(JsObject::with_object_proto(self.intrinsics()))
    }

    fn new_array(&mut self, items: Vec<JsValue>) -> JsValue {
        JsValue::from(JsArray::from_iter(items, self))
    }

    fn new_function(&mut self, name: &str, arity: usize, function: NativeFunction<Self>) -> JsValue {
        let native = BoaNativeFunction::from_copy_closure(move |this, args, context| {
            function(context, this, args).map_err(JsError::from_opaque)
        });
        let function = FunctionObjectBuilder::new(self.realm(), native)
            .name(JsString::from(name))
            .length(arity)
            .build();
        JsValue::from(function)
    }

    fn get_property(&mut self, object: &JsValue, name: &str) -> Result<JsValue, JsValue> {
        let object = object.to_object(self).map_err(|err| thrown(self, err))?;
        object
            .get(JsString::from(name), self)
            .map_err(|err| thrown(self, err))
    }

    fn set_property(&mut self, object: &JsValue, name: &str, value: JsValue) -> Result<(), JsValue> {
        let object = object.to_object(self).map_err(|err| thrown(self, err))?;
        object
            .set(JsString::from(name), value, false, self)
            .map(drop)
            .map_err(|err| thrown(self, err))
    }

    fn new_error(&mut self, kind: ErrorKind, message: &str) -> JsValue {
        let error = match kind {
            ErrorKind::Error => JsNativeError::error(),
            ErrorKind::TypeError => JsNativeError::typ(),
            ErrorKind::RangeError => JsNativeError::range(),
        };
        JsValue::from(error.with_message(message.to_string()).to_opaque(self))
    }

    fn call(&mut self, callee: &JsValue, this: &JsValue, args: &[JsValue]) -> Result<JsValue, JsValue> {
        let Some(function) = callee.as_callable().cloned() else {
            return Err(self.new_error(ErrorKind::TypeError, "value is not a function"));
        };
        function.call(this, args, self).map_err(|err| thrown(self, err))
    }

    fn evaluate_module(&mut self, scope: &ModuleScope<JsValue>) -> Result<(), JsValue> {
        let wrapped = format!(
            "(function (exports, require, module, __filename, __dirname) {{\n{}\n}})",
            scope.source
        );
        let body = self
            .eval(Source::from_bytes(wrapped.as_bytes()))
            .map_err(|err| thrown(self, err))?;
        let bind = self
            .eval(Source::from_bytes(BIND_REQUIRE))
            .map_err(|err| thrown(self, err))?;

        let filename = self.string(&scope.filename.to_string_lossy());
        let dirname = self.string(&scope.dirname.to_string_lossy());
        let undefined = JsValue::undefined();
        let require = HostEngine::call(self, &bind, &undefined, &[scope.require.clone(), dirname.clone()])?;

        HostEngine::call(
            self,
            &body,
            &scope.exports,
            &[scope.exports.clone(), require, scope.module.clone(), filename, dirname],
        )
        .map(drop)
    }

    fn run_microtasks(&mut self) {
        let _ = self.run_jobs();
    }
}
