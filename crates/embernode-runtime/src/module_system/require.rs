// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() implementation
//!
//! Resolution order:
//! 1. native modules, whose ids are reserved
//! 2. the cache, by the id as written
//! 3. the resolver; the cache (and the set of modules still evaluating)
//!    by canonical id; finally a fresh evaluation
//!
//! A module required again while its own body is still running gets the
//! `exports` it has populated so far.

use crate::engine::{HostEngine, ModuleScope, define_value};
use crate::error::{Exception, ScriptResult};
use crate::module_system::resolver::ResolvedModule;
use crate::runtime::RuntimeInstance;
use std::path::Path;

/// require(): resolve `id` to its exports, loading it on first use
pub fn require<E: HostEngine>(
    instance: &RuntimeInstance<E>,
    engine: &mut E,
    id: &str,
    context_dir: Option<&Path>,
) -> ScriptResult<E::Value, E::Value> {
    {
        let modules = instance.modules().lock();
        if let Some(native) = modules.get_native(id) {
            tracing::trace!(id, "require: native module");
            return Ok(native);
        }
        if let Some(module) = modules.get_cached(id) {
            drop(modules);
            tracing::trace!(id, "require: cache hit");
            return exports_of(engine, &module);
        }
    }

    let resolved = instance.resolver().resolve(id, context_dir)?;

    let (cached, partial) = {
        let modules = instance.modules().lock();
        (modules.get_cached(&resolved.id), modules.loading(&resolved.id))
    };
    if let Some(module) = cached {
        tracing::trace!(id = %resolved.id, "require: cache hit");
        return exports_of(engine, &module);
    }
    if let Some(module) = partial {
        tracing::debug!(id = %resolved.id, "require: circular dependency, returning partial exports");
        return exports_of(engine, &module);
    }

    evaluate(instance, engine, resolved)
}

/// Resolve without loading (`require.resolve`)
pub fn require_resolve<E: HostEngine>(
    instance: &RuntimeInstance<E>,
    id: &str,
    context_dir: Option<&Path>,
) -> ScriptResult<String, E::Value> {
    if instance.modules().lock().has_native(id) {
        return Ok(id.to_string());
    }
    Ok(instance.resolver().resolve(id, context_dir)?.id)
}

fn evaluate<E: HostEngine>(
    instance: &RuntimeInstance<E>,
    engine: &mut E,
    resolved: ResolvedModule,
) -> ScriptResult<E::Value, E::Value> {
    let module = engine.new_object();
    let exports = engine.new_object();

    let id_value = engine.string(&resolved.id);
    let filename_value = engine.string(&resolved.filename.display().to_string());
    let not_loaded = engine.boolean(false);
    define_value(engine, &module, "id", id_value)?;
    define_value(engine, &module, "filename", filename_value)?;
    define_value(engine, &module, "loaded", not_loaded)?;
    define_value(engine, &module, "exports", exports.clone())?;

    let scope = ModuleScope {
        dirname: resolved.dirname(),
        id: resolved.id,
        filename: resolved.filename,
        source: resolved.source,
        module: module.clone(),
        exports,
        require: instance.require_function().clone(),
    };

    instance
        .modules()
        .lock()
        .begin_loading(scope.id.clone(), module.clone());

    tracing::debug!(id = %scope.id, "evaluating module");
    let result = engine.evaluate_module(&scope);

    instance.modules().lock().finish_loading(&scope.id);
    result.map_err(Exception::Thrown)?;

    let loaded = engine.boolean(true);
    define_value(engine, &module, "loaded", loaded)?;

    instance
        .modules()
        .lock()
        .cache(scope.id, module.clone(), scope.filename);

    exports_of(engine, &module)
}

fn exports_of<E: HostEngine>(engine: &mut E, module: &E::Value) -> ScriptResult<E::Value, E::Value> {
    engine
        .get_property(module, "exports")
        .map_err(Exception::Thrown)
}
