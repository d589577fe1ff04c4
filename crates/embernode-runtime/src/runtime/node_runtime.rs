// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Main runtime implementation

use crate::config::RuntimeConfig;
use crate::engine::{HostEngine, InstanceRegistry};
use crate::error::{NodeError, Result, ScriptResult};
use crate::globals;
use crate::module_system::{FsResolver, ModuleResolver};
use crate::modules::NativeModule;
use crate::runtime::event_loop::{TickId, TimerId};
use crate::runtime::instance::RuntimeInstance;
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;

/// The Node-compatible runtime attached to one host engine.
///
/// Creating it registers the engine with its instance registry, builds the
/// native modules and installs the globals. Dropping it detaches the
/// engine again before anything else is torn down.
pub struct Runtime<E: HostEngine> {
    instance: Arc<RuntimeInstance<E>>,
    registry: Arc<InstanceRegistry<E>>,
}

impl<E: HostEngine> Runtime<E> {
    /// Attach a runtime resolving user modules from the filesystem
    pub fn new(engine: &mut E, config: RuntimeConfig) -> ScriptResult<Self, E::Value> {
        let base_dir = match &config.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(NodeError::from)?,
        };
        Self::with_resolver(engine, config, Box::new(FsResolver::new(base_dir)))
    }

    /// Attach a runtime with a custom module resolver
    pub fn with_resolver(
        engine: &mut E,
        config: RuntimeConfig,
        resolver: Box<dyn ModuleResolver>,
    ) -> ScriptResult<Self, E::Value> {
        let instance = Arc::new(RuntimeInstance::new(engine, config, resolver));
        let registry = engine.instance_registry();
        registry.register(engine.engine_id(), &instance);

        // Constructed before installation so a failure still unregisters
        let runtime = Self { instance, registry };
        runtime.install(engine)?;

        tracing::debug!(engine = %engine.engine_id(), "runtime attached");
        Ok(runtime)
    }

    fn install(&self, engine: &mut E) -> ScriptResult<(), E::Value> {
        for native in NativeModule::ALL {
            let module = native.create(engine)?;
            self.instance
                .modules()
                .lock()
                .register_native(native.id(), module);
        }
        globals::install(engine, &self.instance)
    }

    /// require() from the top level.
    ///
    /// Engine microtasks queued by the module body are drained before
    /// this returns, so they run ahead of any timer or next-tick.
    pub fn require(&self, engine: &mut E, id: &str) -> ScriptResult<E::Value, E::Value> {
        let result = self.instance.require(engine, id, None);
        engine.run_microtasks();
        result
    }

    /// Load the program entry point.
    ///
    /// Like [`require`](Self::require), but a module whose exports end up
    /// `undefined` is an error: there is nothing for the host to run.
    pub fn require_main(&self, engine: &mut E, id: &str) -> ScriptResult<E::Value, E::Value> {
        let exports = self.require(engine, id)?;
        if engine.is_undefined(&exports) {
            return Err(NodeError::Generic(format!("main module '{id}' produced no exports")).into());
        }
        Ok(exports)
    }

    /// require() as seen from a module in `context_dir`
    pub fn require_from(
        &self,
        engine: &mut E,
        id: &str,
        context_dir: &Path,
    ) -> ScriptResult<E::Value, E::Value> {
        let result = self.instance.require(engine, id, Some(context_dir));
        engine.run_microtasks();
        result
    }

    /// setTimeout
    pub fn set_timeout(&self, callback: E::Value, delay_ms: f64) -> Result<TimerId> {
        self.instance.scheduler().lock().set_timeout(callback, delay_ms)
    }

    /// clearTimeout
    pub fn clear_timeout(&self, id: TimerId) {
        self.instance.scheduler().lock().clear_timeout(id);
    }

    /// setInterval
    pub fn set_interval(&self, callback: E::Value, delay_ms: f64) -> Result<TimerId> {
        self.instance.scheduler().lock().set_interval(callback, delay_ms)
    }

    /// clearInterval
    pub fn clear_interval(&self, id: TimerId) {
        self.instance.scheduler().lock().clear_interval(id);
    }

    /// process.nextTick
    pub fn next_tick(&self, callback: E::Value) -> TickId {
        self.instance.scheduler().lock().next_tick(callback)
    }

    /// Dispatch everything that is ready now
    pub fn run_ready(&self, engine: &mut E) -> ScriptResult<usize, E::Value> {
        self.run_ready_at(engine, Instant::now())
    }

    /// Dispatch everything ready at `now`: pending ticks first, then due
    /// timers, re-checking ticks after every callback. Returns the number
    /// of notifications handled.
    pub fn run_ready_at(&self, engine: &mut E, now: Instant) -> ScriptResult<usize, E::Value> {
        let event_loop = Arc::clone(self.instance.event_loop());
        let mut handled = 0;

        while !event_loop.is_stopped() {
            let Some(event) = event_loop.poll_event(now) else {
                break;
            };
            self.instance.dispatch(engine, event)?;
            handled += 1;
        }

        Ok(handled)
    }

    /// Run the event loop and return the exit code.
    ///
    /// Returns once the loop is stopped or, with `exit_when_idle`, once
    /// nothing is pending. An exception escaping a callback ends the loop.
    pub async fn run_event_loop(&self, engine: &mut E) -> ScriptResult<i32, E::Value> {
        let event_loop = Arc::clone(self.instance.event_loop());
        tracing::debug!(engine = %self.instance.engine_id(), "event loop started");
        engine.run_microtasks();

        loop {
            if let Err(err) = self.run_ready(engine) {
                tracing::error!("uncaught exception: {}", err.describe(engine));
                return Err(err);
            }
            if event_loop.is_stopped() {
                break;
            }
            if self.instance.config().exit_when_idle && event_loop.is_idle() {
                break;
            }
            event_loop.wait().await;
        }

        tracing::debug!(engine = %self.instance.engine_id(), "event loop finished");
        Ok(self.exit_code())
    }

    /// Stop the event loop
    pub fn stop(&self) {
        self.instance.event_loop().stop();
    }

    /// Exit code set through `process.exit`, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        self.instance.exit_code().unwrap_or(0)
    }

    /// The shared runtime state
    pub fn instance(&self) -> &Arc<RuntimeInstance<E>> {
        &self.instance
    }
}

impl<E: HostEngine> Drop for Runtime<E> {
    fn drop(&mut self) {
        self.registry.unregister(self.instance.engine_id());
        self.instance.event_loop().stop();
    }
}
