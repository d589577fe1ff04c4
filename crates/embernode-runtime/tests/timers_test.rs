// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Timers, next-ticks and the event loop driven through script globals

mod common;

use common::{MapResolver, MockEngine, Value, bare_runtime, runtime_with};
use embernode_runtime::engine::HostEngine;
use embernode_runtime::{Exception, InstanceRegistry, RuntimeConfig};
use std::time::Duration;
use tokio::time::Instant;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn set_timeout(engine: &mut MockEngine, callback: Value, delay: f64) -> Value {
    let delay = engine.number(delay);
    engine.call_global("setTimeout", &[callback, delay]).unwrap()
}

fn next_tick(engine: &mut MockEngine, callback: Value) {
    let global = engine.global_object();
    let process = engine.prop(&global, "process");
    engine.call_method(&process, "nextTick", &[callback]).unwrap();
}

#[test]
fn test_next_tick_runs_before_zero_delay_timeout() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let timeout = engine.logger("timeout");
    set_timeout(&mut engine, timeout, 0.0);
    let tick = engine.logger("tick");
    next_tick(&mut engine, tick);

    let handled = runtime.run_ready_at(&mut engine, start + ms(50)).unwrap();
    assert_eq!(handled, 2);
    assert_eq!(engine.entries(), vec!["tick", "timeout"]);
}

#[test]
fn test_tick_queued_by_a_timer_runs_before_the_next_timer() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let first = engine.callback(|engine, _this, _args| {
        engine.log.borrow_mut().push("first".to_string());
        let tick = engine.logger("tick");
        next_tick(engine, tick);
        Ok(Value::Undefined)
    });
    set_timeout(&mut engine, first, 10.0);
    let second = engine.logger("second");
    set_timeout(&mut engine, second, 10.0);

    runtime.run_ready_at(&mut engine, start + ms(100)).unwrap();
    assert_eq!(engine.entries(), vec!["first", "tick", "second"]);
}

#[test]
fn test_clear_timeout_is_idempotent() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let fired = engine.logger("fired");
    let handle = set_timeout(&mut engine, fired, 5.0);
    runtime.run_ready_at(&mut engine, start + ms(50)).unwrap();

    // After firing, then twice more, then with a handle that never existed
    engine.call_global("clearTimeout", &[handle.clone()]).unwrap();
    engine.call_global("clearTimeout", &[handle]).unwrap();
    let unknown = engine.number(9999.0);
    engine.call_global("clearTimeout", &[unknown]).unwrap();

    let pending = engine.logger("cancelled");
    let handle = set_timeout(&mut engine, pending, 5.0);
    engine.call_global("clearTimeout", &[handle.clone()]).unwrap();
    engine.call_global("clearTimeout", &[handle]).unwrap();

    runtime.run_ready_at(&mut engine, start + ms(500)).unwrap();
    assert_eq!(engine.entries(), vec!["fired"]);
}

#[test]
fn test_non_callable_callback_is_rejected_without_registering() {
    let (mut engine, runtime) = bare_runtime();

    let not_a_function = engine.number(42.0);
    let delay = engine.number(10.0);
    let err = engine
        .call_global("setTimeout", &[not_a_function, delay])
        .unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("TypeError"));

    let err = engine.call_global("setInterval", &[]).unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("TypeError"));

    let callback = engine.logger("never");
    let delay = engine.string("10");
    let err = engine.call_global("setTimeout", &[callback, delay]).unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("TypeError"));

    let handle = engine.string("1");
    let err = engine.call_global("clearTimeout", &[handle]).unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("TypeError"));

    assert_eq!(runtime.instance().scheduler().lock().live_timeouts(), 0);
    assert_eq!(runtime.instance().event_loop().live_timers(), 0);
}

#[test]
fn test_non_positive_delays_still_fire_once_later() {
    let (mut engine, runtime) = bare_runtime();

    let negative = engine.logger("negative");
    set_timeout(&mut engine, negative, -5.0);
    let zero = engine.logger("zero");
    set_timeout(&mut engine, zero, 0.0);
    let not_a_number = engine.logger("nan");
    set_timeout(&mut engine, not_a_number, f64::NAN);

    // Nothing runs synchronously
    assert!(engine.entries().is_empty());

    let later = Instant::now() + ms(50);
    runtime.run_ready_at(&mut engine, later).unwrap();
    runtime.run_ready_at(&mut engine, later + ms(50)).unwrap();
    assert_eq!(engine.entries(), vec!["negative", "zero", "nan"]);
}

#[test]
fn test_interval_fires_until_cleared() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let tick = engine.logger("interval");
    let delay = engine.number(10.0);
    let handle = engine.call_global("setInterval", &[tick, delay]).unwrap();

    for k in 1..=4 {
        runtime.run_ready_at(&mut engine, start + ms(100 * k)).unwrap();
    }
    assert_eq!(engine.entries().len(), 4);

    engine.call_global("clearInterval", &[handle.clone()]).unwrap();
    runtime.run_ready_at(&mut engine, start + ms(1000)).unwrap();
    assert_eq!(engine.entries().len(), 4);
    assert_eq!(runtime.instance().scheduler().lock().live_intervals(), 0);

    engine.call_global("clearInterval", &[handle]).unwrap();
}

#[test]
fn test_timer_capacity_is_a_resource_error() {
    let config = RuntimeConfig {
        max_timers: 2,
        ..RuntimeConfig::default()
    };
    let (mut engine, runtime) =
        runtime_with(&InstanceRegistry::shared(), MapResolver::new(), config);

    for _ in 0..2 {
        let callback = engine.logger("ok");
        set_timeout(&mut engine, callback, 1000.0);
    }
    let callback = engine.logger("refused");
    let delay = engine.number(1000.0);
    let err = engine.call_global("setTimeout", &[callback, delay]).unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("Error"));
    let message = engine.prop(&err, "message");
    assert!(engine.display(&message).contains("unable to start timer"));

    assert_eq!(runtime.instance().scheduler().lock().live_timeouts(), 2);
}

#[test]
fn test_process_exit_stops_the_loop() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let exit = engine.callback(|engine, _this, _args| {
        let global = engine.global_object();
        let process = engine.prop(&global, "process");
        let code = engine.number(3.0);
        engine.call_method(&process, "exit", &[code])
    });
    set_timeout(&mut engine, exit, 10.0);
    let after = engine.logger("after exit");
    set_timeout(&mut engine, after, 20.0);

    let handled = runtime.run_ready_at(&mut engine, start + ms(500)).unwrap();
    assert_eq!(handled, 1);
    assert_eq!(runtime.exit_code(), 3);
    assert!(engine.entries().is_empty());
}

#[test]
fn test_uncaught_callback_error_is_returned() {
    let (mut engine, runtime) = bare_runtime();
    let start = Instant::now();

    let throws = engine.callback(|engine, _this, _args| Err(engine.string("kaboom")));
    set_timeout(&mut engine, throws, 1.0);

    match runtime.run_ready_at(&mut engine, start + ms(50)) {
        Err(Exception::Thrown(value)) => {
            assert_eq!(engine.as_string(&value).as_deref(), Some("kaboom"));
        }
        other => panic!("expected the thrown value, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_event_loop_returns_when_idle() {
    let config = RuntimeConfig {
        exit_when_idle: true,
        ..RuntimeConfig::default()
    };
    let (mut engine, runtime) =
        runtime_with(&InstanceRegistry::shared(), MapResolver::new(), config);

    let chained = engine.callback(|engine, _this, _args| {
        engine.log.borrow_mut().push("outer".to_string());
        let inner = engine.logger("inner");
        set_timeout(engine, inner, 1.0);
        Ok(Value::Undefined)
    });
    set_timeout(&mut engine, chained, 1.0);

    let code = runtime.run_event_loop(&mut engine).await.unwrap();
    assert_eq!(code, 0);
    assert_eq!(engine.entries(), vec!["outer", "inner"]);
}
