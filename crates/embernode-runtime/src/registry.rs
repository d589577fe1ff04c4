// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Engine identity -> runtime instance table
//!
//! Native functions only ever see the engine they were called from. This
//! table lets them get back to the runtime that owns that engine. It is
//! the one structure shared between runtime instances, so every access
//! goes through the map's shard locks; the table is `Send + Sync`
//! whenever the instance type is.
//!
//! Entries hold weak references: the registry never keeps a runtime alive.

use crate::engine::EngineId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Weak};

/// Thread-safe engine registry
pub struct EngineRegistry<T> {
    instances: DashMap<EngineId, Weak<T>>,
}

impl<T> EngineRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    /// Create an empty registry behind an `Arc`, ready to hand to engines
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register the runtime owning `engine`.
    ///
    /// # Panics
    ///
    /// If `engine` is already registered.
    pub fn register(&self, engine: EngineId, instance: &Arc<T>) {
        match self.instances.entry(engine) {
            Entry::Occupied(_) => panic!("{engine} is already registered with a runtime"),
            Entry::Vacant(slot) => {
                slot.insert(Arc::downgrade(instance));
            }
        }
        tracing::debug!(%engine, "registered runtime instance");
    }

    /// Remove the entry for `engine`
    pub fn unregister(&self, engine: EngineId) {
        if self.instances.remove(&engine).is_some() {
            tracing::debug!(%engine, "unregistered runtime instance");
        }
    }

    /// The runtime owning `engine`, if it is still alive
    pub fn lookup(&self, engine: EngineId) -> Option<Arc<T>> {
        self.instances.get(&engine).and_then(|entry| entry.value().upgrade())
    }

    /// Whether `engine` has an entry
    pub fn contains(&self, engine: EngineId) -> bool {
        self.instances.contains_key(&engine)
    }

    /// Number of registered engines
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl<T> Default for EngineRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
