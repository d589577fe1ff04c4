// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `process` global object

use crate::config::RuntimeConfig;
use crate::engine::{HostEngine, args, define_function, define_value, settle};
use crate::errno;
use crate::error::ScriptResult;
use crate::runtime::RuntimeInstance;

/// Create the process object
pub fn create_process_object<E: HostEngine>(
    engine: &mut E,
    config: &RuntimeConfig,
) -> ScriptResult<E::Value, E::Value> {
    let process = engine.new_object();

    // process.argv
    let argv: Vec<_> = config.argv.iter().map(|arg| engine.string(arg)).collect();
    let argv = engine.new_array(argv);
    define_value(engine, &process, "argv", argv)?;

    // process.env
    let env = engine.new_object();
    for (key, value) in std::env::vars() {
        let value = engine.string(&value);
        define_value(engine, &env, &key, value)?;
    }
    define_value(engine, &process, "env", env)?;

    let pid = engine.number(f64::from(std::process::id()));
    define_value(engine, &process, "pid", pid)?;

    let platform = engine.string(platform());
    define_value(engine, &process, "platform", platform)?;

    let arch = engine.string(arch());
    define_value(engine, &process, "arch", arch)?;

    let version = engine.string(&format!("v{}", crate::VERSION));
    define_value(engine, &process, "version", version)?;

    define_function(engine, &process, "nextTick", 1, next_tick::<E>)?;
    define_function(engine, &process, "exit", 1, exit::<E>)?;
    define_function(engine, &process, "cwd", 0, cwd::<E>)?;

    Ok(process)
}

/// process.nextTick(callback)
pub fn next_tick<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = queue_tick(engine, args);
    settle(engine, result)
}

/// process.exit(code?)
pub fn exit<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = request_exit(engine, args);
    settle(engine, result)
}

/// process.cwd()
pub fn cwd<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = match std::env::current_dir() {
        Ok(dir) => Ok(engine.string(&dir.display().to_string())),
        Err(err) => Err(errno::from_io_error(engine, &err, "uv_cwd", "")),
    };
    settle(engine, result)
}

fn queue_tick<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let callback = args::callable(engine, args, 0, "process.nextTick", "callback")?;
    let instance = RuntimeInstance::from_engine(engine)?;
    instance.scheduler().lock().next_tick(callback);
    Ok(engine.undefined())
}

fn request_exit<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let code = match args.first() {
        Some(value) if !engine.is_undefined(value) => {
            args::number(engine, args, 0, "process.exit", "code")? as i32
        }
        _ => 0,
    };
    RuntimeInstance::from_engine(engine)?.exit(code);
    Ok(engine.undefined())
}

/// Get the platform string
pub fn platform() -> &'static str {
    if cfg!(target_os = "windows") {
        "win32"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "freebsd") {
        "freebsd"
    } else if cfg!(target_os = "openbsd") {
        "openbsd"
    } else {
        "unknown"
    }
}

/// Get the architecture string
pub fn arch() -> &'static str {
    if cfg!(target_arch = "x86_64") {
        "x64"
    } else if cfg!(target_arch = "x86") {
        "ia32"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else if cfg!(target_arch = "arm") {
        "arm"
    } else {
        "unknown"
    }
}
