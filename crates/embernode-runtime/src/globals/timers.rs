// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Timer functions: setTimeout, setInterval, clearTimeout, clearInterval

use crate::engine::{HostEngine, args, define_function, settle};
use crate::error::ScriptResult;
use crate::runtime::{RuntimeInstance, TimerId};

/// Install the timer functions on `global`
pub fn install<E: HostEngine>(engine: &mut E, global: &E::Value) -> ScriptResult<(), E::Value> {
    define_function(engine, global, "setTimeout", 2, set_timeout::<E>)?;
    define_function(engine, global, "clearTimeout", 1, clear_timeout::<E>)?;
    define_function(engine, global, "setInterval", 2, set_interval::<E>)?;
    define_function(engine, global, "clearInterval", 1, clear_interval::<E>)?;
    Ok(())
}

/// setTimeout(callback, delay)
pub fn set_timeout<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = schedule(engine, args, "setTimeout", false);
    settle(engine, result)
}

/// setInterval(callback, delay)
pub fn set_interval<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = schedule(engine, args, "setInterval", true);
    settle(engine, result)
}

/// clearTimeout(id)
pub fn clear_timeout<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = cancel(engine, args, "clearTimeout", false);
    settle(engine, result)
}

/// clearInterval(id)
pub fn clear_interval<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = cancel(engine, args, "clearInterval", true);
    settle(engine, result)
}

fn schedule<E: HostEngine>(
    engine: &mut E,
    args: &[E::Value],
    function: &str,
    repeating: bool,
) -> ScriptResult<E::Value, E::Value> {
    let callback = args::callable(engine, args, 0, function, "callback")?;
    let delay = args::number(engine, args, 1, function, "delay")?;
    let instance = RuntimeInstance::from_engine(engine)?;

    let id = {
        let mut scheduler = instance.scheduler().lock();
        if repeating {
            scheduler.set_interval(callback, delay)?
        } else {
            scheduler.set_timeout(callback, delay)?
        }
    };

    Ok(engine.number(id.0 as f64))
}

fn cancel<E: HostEngine>(
    engine: &mut E,
    args: &[E::Value],
    function: &str,
    repeating: bool,
) -> ScriptResult<E::Value, E::Value> {
    let handle = args::number(engine, args, 0, function, "id")?;
    let instance = RuntimeInstance::from_engine(engine)?;

    // Anything that cannot be a handle is simply not live
    if let Some(id) = timer_id(handle) {
        let mut scheduler = instance.scheduler().lock();
        if repeating {
            scheduler.clear_interval(id);
        } else {
            scheduler.clear_timeout(id);
        }
    }

    Ok(engine.undefined())
}

fn timer_id(handle: f64) -> Option<TimerId> {
    (handle.is_finite() && handle >= 1.0 && handle.fract() == 0.0 && handle <= u64::MAX as f64)
        .then(|| TimerId(handle as u64))
}
