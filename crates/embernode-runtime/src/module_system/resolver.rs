// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module specifier resolution

use crate::error::{NodeError, Result};
use std::path::{Path, PathBuf};

/// A user module located and read by a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Canonical identifier, used as the cache key
    pub id: String,
    /// Absolute filename
    pub filename: PathBuf,
    /// Source text
    pub source: String,
}

impl ResolvedModule {
    /// Directory containing the module
    pub fn dirname(&self) -> PathBuf {
        self.filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Turns a specifier into module source
pub trait ModuleResolver {
    /// Resolve `specifier` as seen from the module living in `context_dir`
    /// (`None` for the top level)
    fn resolve(&self, specifier: &str, context_dir: Option<&Path>) -> Result<ResolvedModule>;
}

/// Check if a specifier is a relative or absolute path
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || Path::new(specifier).is_absolute()
}

/// Filesystem resolver: relative and absolute paths only
#[derive(Debug, Clone)]
pub struct FsResolver {
    /// Directory top-level specifiers are resolved against
    base_dir: PathBuf,
}

impl FsResolver {
    /// Create a resolver rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolver rooted at the current working directory
    pub fn from_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// The base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ModuleResolver for FsResolver {
    fn resolve(&self, specifier: &str, context_dir: Option<&Path>) -> Result<ResolvedModule> {
        if !is_path_specifier(specifier) {
            return Err(NodeError::module_not_found(specifier));
        }

        let parent_dir = context_dir.unwrap_or(&self.base_dir);
        let path = parent_dir.join(specifier);

        if !path.is_file() {
            return Err(NodeError::module_not_found(specifier));
        }

        let filename = path.canonicalize().map_err(|e| NodeError::ModuleResolution {
            module: specifier.to_string(),
            reason: e.to_string(),
        })?;
        let source = std::fs::read_to_string(&filename).map_err(|e| NodeError::ModuleResolution {
            module: specifier.to_string(),
            reason: e.to_string(),
        })?;

        tracing::trace!(specifier, filename = %filename.display(), "resolved module");

        Ok(ResolvedModule {
            id: filename.display().to_string(),
            filename,
            source,
        })
    }
}

impl Default for FsResolver {
    fn default() -> Self {
        Self::from_current_dir()
    }
}
