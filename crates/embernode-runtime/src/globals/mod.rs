// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js global objects and functions
//!
//! Implements:
//! - `Buffer` - Byte buffers with utf8, ascii and latin1 text encodings
//! - `console` - Formatted output to stdout and stderr
//! - `process` - Process information and control
//! - `setTimeout`, `setInterval` - Timer functions
//! - `clearTimeout`, `clearInterval` - Timer cancellation
//! - `require` - CommonJS module loading
//! - `global` - The global object

pub mod buffer;
pub mod console;
pub mod process;
pub mod timers;

use crate::engine::{HostEngine, args, define_function, define_value, settle};
use crate::error::ScriptResult;
use crate::module_system;
use crate::runtime::RuntimeInstance;
use std::path::Path;

/// Install every global on the engine's global object
pub fn install<E: HostEngine>(
    engine: &mut E,
    instance: &RuntimeInstance<E>,
) -> ScriptResult<(), E::Value> {
    let global = engine.global_object();

    timers::install(engine, &global)?;

    let require = instance.require_function().clone();
    define_function(engine, &require, "resolve", 2, require_resolve::<E>)?;
    define_value(engine, &global, "require", require)?;

    let process = process::create_process_object(engine, instance.config())?;
    define_value(engine, &global, "process", process)?;

    let console = console::create_console_object(engine)?;
    define_value(engine, &global, "console", console)?;

    let buffer = buffer::create_buffer_class(engine)?;
    define_value(engine, &global, "Buffer", buffer)?;

    define_value(engine, &global, "global", global.clone())?;
    Ok(())
}

/// require(id, contextDir?)
///
/// Module bodies see a one-argument wrapper that supplies their own
/// directory as `contextDir`.
pub fn require<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = load(engine, args);
    settle(engine, result)
}

/// require.resolve(id, contextDir?)
pub fn require_resolve<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = resolve(engine, args);
    settle(engine, result)
}

fn load<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let id = args::string(engine, args, 0, "require", "id")?;
    let context_dir = args::optional_string(engine, args, 1, "require", "contextDir")?;
    let instance = RuntimeInstance::from_engine(engine)?;
    instance.require(engine, &id, context_dir.as_deref().map(Path::new))
}

fn resolve<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let id = args::string(engine, args, 0, "require.resolve", "id")?;
    let context_dir = args::optional_string(engine, args, 1, "require.resolve", "contextDir")?;
    let instance = RuntimeInstance::from_engine(engine)?;
    let resolved =
        module_system::require_resolve(&instance, &id, context_dir.as_deref().map(Path::new))?;
    Ok(engine.string(&resolved))
}
