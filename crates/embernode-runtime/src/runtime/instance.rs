// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-engine runtime state

use crate::config::RuntimeConfig;
use crate::engine::{EngineId, HostEngine};
use crate::error::{Exception, NodeError, Result, ScriptResult};
use crate::globals;
use crate::module_system::{self, ModuleRegistry, ModuleResolver};
use crate::runtime::event_loop::{EventLoop, LoopEvent};
use crate::runtime::scheduler::Scheduler;
use parking_lot::Mutex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Everything one engine's runtime owns: module tables, live timers and
/// the event loop they are registered with.
///
/// Locks are only held while the tables are touched, never across a call
/// into the engine, so callbacks may re-enter `require` or the timer
/// functions freely.
pub struct RuntimeInstance<E: HostEngine> {
    engine_id: EngineId,
    config: RuntimeConfig,
    modules: Mutex<ModuleRegistry<E::Value>>,
    scheduler: Mutex<Scheduler<E::Value>>,
    resolver: Box<dyn ModuleResolver>,
    event_loop: Arc<EventLoop>,
    require_function: E::Value,
    exit_code: Mutex<Option<i32>>,
}

impl<E: HostEngine> RuntimeInstance<E> {
    /// Create the state for `engine`. Registration and installation are
    /// left to [`crate::runtime::Runtime`].
    pub fn new(engine: &mut E, config: RuntimeConfig, resolver: Box<dyn ModuleResolver>) -> Self {
        let event_loop = Arc::new(EventLoop::with_capacity(config.max_timers));
        let require_function = engine.new_function("require", 2, globals::require::<E>);

        Self {
            engine_id: engine.engine_id(),
            config,
            modules: Mutex::new(ModuleRegistry::new()),
            scheduler: Mutex::new(Scheduler::new(event_loop.clone())),
            resolver,
            event_loop,
            require_function,
            exit_code: Mutex::new(None),
        }
    }

    /// The runtime attached to `engine`
    pub fn from_engine(engine: &E) -> Result<Arc<Self>> {
        let id = engine.engine_id();
        engine
            .instance_registry()
            .lookup(id)
            .ok_or_else(|| NodeError::Generic(format!("no runtime attached to {id}")))
    }

    /// require() as seen from a module living in `context_dir`
    pub fn require(
        &self,
        engine: &mut E,
        id: &str,
        context_dir: Option<&Path>,
    ) -> ScriptResult<E::Value, E::Value> {
        module_system::require(self, engine, id, context_dir)
    }

    /// Run the callback a loop notification refers to.
    ///
    /// The callback gets no arguments and the global object as `this`.
    /// Stale notifications are dropped.
    pub fn dispatch(&self, engine: &mut E, event: LoopEvent) -> ScriptResult<(), E::Value> {
        let callback = self.scheduler.lock().take_callback(event);
        let Some(callback) = callback else {
            return Ok(());
        };

        let this = engine.global_object();
        let result = engine.call(&callback, &this, &[]);
        engine.run_microtasks();
        result.map(drop).map_err(Exception::Thrown)
    }

    /// Record an exit code and stop the loop (`process.exit`)
    pub fn exit(&self, code: i32) {
        tracing::debug!(engine = %self.engine_id, code, "process.exit");
        *self.exit_code.lock() = Some(code);
        self.event_loop.stop();
    }

    /// Exit code recorded by `process.exit`, if any
    pub fn exit_code(&self) -> Option<i32> {
        *self.exit_code.lock()
    }

    /// The engine this instance belongs to
    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    /// Configuration the runtime was created with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Native modules and the user module cache
    pub fn modules(&self) -> &Mutex<ModuleRegistry<E::Value>> {
        &self.modules
    }

    /// Live timers and pending ticks
    pub fn scheduler(&self) -> &Mutex<Scheduler<E::Value>> {
        &self.scheduler
    }

    /// The module resolver
    pub fn resolver(&self) -> &dyn ModuleResolver {
        self.resolver.as_ref()
    }

    /// The event loop timers are registered with
    pub fn event_loop(&self) -> &Arc<EventLoop> {
        &self.event_loop
    }

    /// The global `require(id, contextDir)` function
    pub fn require_function(&self) -> &E::Value {
        &self.require_function
    }
}

impl<E: HostEngine> fmt::Debug for RuntimeInstance<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeInstance")
            .field("engine_id", &self.engine_id)
            .field("config", &self.config)
            .field("scheduler", &*self.scheduler.lock())
            .field("event_loop", &self.event_loop)
            .finish_non_exhaustive()
    }
}
