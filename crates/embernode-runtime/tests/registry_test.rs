// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Several runtimes sharing one instance registry

mod common;

use common::{MapResolver, MockEngine, Value, runtime_with};
use embernode_runtime::engine::{HostEngine, ModuleScope};
use embernode_runtime::{InstanceRegistry, RuntimeConfig};
use std::time::Duration;
use tokio::time::Instant;

fn counter_body(engine: &mut MockEngine, scope: &ModuleScope<Value>) -> Result<(), Value> {
    engine.log.borrow_mut().push("eval".to_string());
    let exports = scope.exports.clone();
    let marker = engine.boolean(true);
    engine.set_property(&exports, "loaded", marker)
}

fn resolver() -> MapResolver {
    MapResolver::new().file("/app/counter.js", "counter")
}

#[test]
fn test_module_caches_are_private() {
    let registry = InstanceRegistry::shared();
    let (mut a, runtime_a) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let (mut b, runtime_b) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    a.define_body("counter", counter_body);
    b.define_body("counter", counter_body);

    runtime_a.require(&mut a, "./counter.js").unwrap();
    runtime_a.require(&mut a, "./counter.js").unwrap();
    runtime_b.require(&mut b, "./counter.js").unwrap();

    assert_eq!(a.entries(), vec!["eval"]);
    assert_eq!(b.entries(), vec!["eval"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_timer_handles_are_private() {
    let registry = InstanceRegistry::shared();
    let (mut a, runtime_a) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let (mut b, runtime_b) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let start = Instant::now();

    let callback = a.logger("a fired");
    let delay = a.number(10.0);
    let handle = a.call_global("setTimeout", &[callback, delay]).unwrap();
    let handle = a.as_number(&handle).unwrap();

    // B has no timers, so A's handle means nothing to it
    let foreign = b.number(handle);
    b.call_global("clearTimeout", &[foreign]).unwrap();
    assert_eq!(runtime_b.instance().scheduler().lock().live_timeouts(), 0);

    runtime_a
        .run_ready_at(&mut a, start + Duration::from_millis(100))
        .unwrap();
    assert_eq!(a.entries(), vec!["a fired"]);
}

#[test]
fn test_foreign_handle_does_not_cancel_a_live_timer() {
    let registry = InstanceRegistry::shared();
    let (mut a, runtime_a) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let (mut b, runtime_b) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let start = Instant::now();

    let callback = a.logger("a fired");
    let delay = a.number(10.0);
    let handle_a = a.call_global("setTimeout", &[callback, delay]).unwrap();
    let handle_a = a.as_number(&handle_a).unwrap();

    let callback = b.logger("b fired");
    let delay = b.number(10.0);
    let handle_b = b.call_global("setTimeout", &[callback, delay]).unwrap();
    let handle_b = b.as_number(&handle_b).unwrap();
    assert_ne!(handle_a, handle_b);

    let foreign = b.number(handle_a);
    b.call_global("clearTimeout", &[foreign]).unwrap();
    let foreign = a.number(handle_b);
    a.call_global("clearTimeout", &[foreign]).unwrap();

    let later = start + Duration::from_millis(100);
    runtime_a.run_ready_at(&mut a, later).unwrap();
    runtime_b.run_ready_at(&mut b, later).unwrap();
    assert_eq!(a.entries(), vec!["a fired"]);
    assert_eq!(b.entries(), vec!["b fired"]);
}

#[test]
fn test_dropping_a_runtime_unregisters_it() {
    let registry = InstanceRegistry::shared();
    let (mut engine, runtime) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let id = engine.engine_id();
    assert!(registry.contains(id));

    drop(runtime);
    assert!(!registry.contains(id));
    assert!(registry.is_empty());

    // Globals outlive the runtime but can no longer find it
    let callback = engine.logger("orphan");
    let delay = engine.number(1.0);
    let err = engine.call_global("setTimeout", &[callback, delay]).unwrap_err();
    assert_eq!(engine.error_name(&err).as_deref(), Some("Error"));
}

#[test]
#[should_panic]
fn test_registering_an_engine_twice_panics() {
    let registry = InstanceRegistry::shared();
    let (mut engine, _runtime) = runtime_with(&registry, resolver(), RuntimeConfig::default());
    let _second = embernode_runtime::Runtime::with_resolver(
        &mut engine,
        RuntimeConfig::default(),
        Box::new(resolver()),
    );
}
