// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `os` module implementation

use crate::engine::{HostEngine, define_function, define_value};
use crate::error::ScriptResult;
use crate::globals::process;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// End-of-line marker
pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Create the os module exports
pub fn create_module<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let exports = engine.new_object();

    let eol = engine.string(EOL);
    define_value(engine, &exports, "EOL", eol)?;

    define_function(engine, &exports, "platform", 0, js_platform::<E>)?;
    define_function(engine, &exports, "arch", 0, js_arch::<E>)?;
    define_function(engine, &exports, "type", 0, js_type::<E>)?;
    define_function(engine, &exports, "release", 0, js_release::<E>)?;
    define_function(engine, &exports, "hostname", 0, js_hostname::<E>)?;
    define_function(engine, &exports, "homedir", 0, js_homedir::<E>)?;
    define_function(engine, &exports, "tmpdir", 0, js_tmpdir::<E>)?;
    define_function(engine, &exports, "uptime", 0, js_uptime::<E>)?;
    define_function(engine, &exports, "totalmem", 0, js_totalmem::<E>)?;
    define_function(engine, &exports, "freemem", 0, js_freemem::<E>)?;
    define_function(engine, &exports, "cpus", 0, js_cpus::<E>)?;
    define_function(engine, &exports, "endianness", 0, js_endianness::<E>)?;

    Ok(exports)
}

/// os.type()
pub fn os_type() -> String {
    if cfg!(target_os = "windows") {
        "Windows_NT".to_string()
    } else if cfg!(target_os = "macos") {
        "Darwin".to_string()
    } else if cfg!(target_os = "linux") {
        "Linux".to_string()
    } else {
        System::name().unwrap_or_else(|| "Unknown".to_string())
    }
}

/// os.release()
pub fn release() -> String {
    System::kernel_version().unwrap_or_else(|| "unknown".to_string())
}

/// os.hostname()
pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "localhost".to_string())
}

/// os.homedir()
pub fn homedir() -> String {
    dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// os.tmpdir()
pub fn tmpdir() -> String {
    let dir = std::env::temp_dir().to_string_lossy().to_string();
    match dir.strip_suffix(['/', '\\']) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => dir,
    }
}

/// os.totalmem()
pub fn totalmem() -> u64 {
    memory().total_memory()
}

/// os.freemem()
pub fn freemem() -> u64 {
    memory().available_memory()
}

/// CPU model and clock speed (MHz) per logical CPU
pub fn cpus() -> Vec<(String, u64)> {
    let system = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::everything()));
    system
        .cpus()
        .iter()
        .map(|cpu| (cpu.brand().to_string(), cpu.frequency()))
        .collect()
}

/// os.endianness()
pub fn endianness() -> &'static str {
    if cfg!(target_endian = "big") { "BE" } else { "LE" }
}

fn memory() -> System {
    System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::everything()))
}

fn js_platform<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(process::platform()))
}

fn js_arch<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(process::arch()))
}

fn js_type<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(&os_type()))
}

fn js_release<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(&release()))
}

fn js_hostname<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(&hostname()))
}

fn js_homedir<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(&homedir()))
}

fn js_tmpdir<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(&tmpdir()))
}

fn js_uptime<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.number(System::uptime() as f64))
}

fn js_totalmem<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.number(totalmem() as f64))
}

fn js_freemem<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.number(freemem() as f64))
}

fn js_cpus<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let mut items = Vec::new();
    for (model, speed) in cpus() {
        let info = engine.new_object();
        let model = engine.string(&model);
        engine.set_property(&info, "model", model)?;
        let speed = engine.number(speed as f64);
        engine.set_property(&info, "speed", speed)?;
        items.push(info);
    }
    Ok(engine.new_array(items))
}

fn js_endianness<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    _args: &[E::Value],
) -> Result<E::Value, E::Value> {
    Ok(engine.string(endianness()))
}
