// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Native module table and user module cache

use std::collections::HashMap;
use std::path::PathBuf;

/// A user module that finished evaluating
#[derive(Debug, Clone)]
pub struct CachedModule<V> {
    /// The `module` object
    pub module: V,
    /// The module's filename
    pub filename: PathBuf,
}

/// Per-runtime module state.
///
/// Native modules are installed once while the runtime is built. User
/// modules are cached after their first successful evaluation and are
/// never replaced. Both insertions treat a duplicate id as a bug in the
/// caller and panic.
#[derive(Debug)]
pub struct ModuleRegistry<V> {
    natives: HashMap<String, V>,
    cache: HashMap<String, CachedModule<V>>,
    /// Modules whose body is currently running, keyed by canonical id
    loading: HashMap<String, V>,
}

impl<V: Clone> ModuleRegistry<V> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            natives: HashMap::new(),
            cache: HashMap::new(),
            loading: HashMap::new(),
        }
    }

    /// Install a native module.
    ///
    /// # Panics
    ///
    /// If `id` is already registered.
    pub fn register_native(&mut self, id: impl Into<String>, module: V) {
        let id = id.into();
        assert!(
            !self.natives.contains_key(&id),
            "native module '{id}' registered twice"
        );
        self.natives.insert(id, module);
    }

    /// Check if `id` names a native module
    pub fn has_native(&self, id: &str) -> bool {
        self.natives.contains_key(id)
    }

    /// Get a native module
    pub fn get_native(&self, id: &str) -> Option<V> {
        self.natives.get(id).cloned()
    }

    /// Insert a freshly evaluated module.
    ///
    /// # Panics
    ///
    /// If `id` is already cached.
    pub fn cache(&mut self, id: impl Into<String>, module: V, filename: PathBuf) {
        let id = id.into();
        assert!(
            !self.cache.contains_key(&id),
            "module '{id}' cached twice"
        );
        self.cache.insert(id, CachedModule { module, filename });
    }

    /// Check if a module is cached
    pub fn has_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    /// Get a cached module object
    pub fn get_cached(&self, id: &str) -> Option<V> {
        self.cache.get(id).map(|entry| entry.module.clone())
    }

    /// Get the full cache entry
    pub fn cached_entry(&self, id: &str) -> Option<&CachedModule<V>> {
        self.cache.get(id)
    }

    /// Mark `id` as being evaluated
    pub fn begin_loading(&mut self, id: impl Into<String>, module: V) {
        self.loading.insert(id.into(), module);
    }

    /// The module object of an evaluation still in progress
    pub fn loading(&self, id: &str) -> Option<V> {
        self.loading.get(id).cloned()
    }

    /// Evaluation of `id` ended, successfully or not
    pub fn finish_loading(&mut self, id: &str) -> Option<V> {
        self.loading.remove(id)
    }

    /// Native module ids, sorted
    pub fn native_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.natives.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cached module ids, sorted
    pub fn cached_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.cache.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<V: Clone> Default for ModuleRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
