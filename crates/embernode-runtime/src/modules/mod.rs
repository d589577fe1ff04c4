// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in Node.js modules
//!
//! Implements the core modules fs, os, path and util. Each is built once
//! per runtime, before any script runs, and its id is reserved.

pub mod fs;
pub mod os;
pub mod path;
pub mod util;

use crate::engine::HostEngine;
use crate::error::ScriptResult;
use std::fmt;

/// The native modules a runtime installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeModule {
    /// `fs`
    Fs,
    /// `os`
    Os,
    /// `path`
    Path,
    /// `util`
    Util,
}

impl NativeModule {
    /// Every native module, in installation order
    pub const ALL: [NativeModule; 4] = [Self::Fs, Self::Os, Self::Path, Self::Util];

    /// The id scripts require it by
    pub fn id(self) -> &'static str {
        match self {
            Self::Fs => "fs",
            Self::Os => "os",
            Self::Path => "path",
            Self::Util => "util",
        }
    }

    /// Look up a native module by id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|module| module.id() == id)
    }

    /// Build the module's exports object
    pub fn create<E: HostEngine>(self, engine: &mut E) -> ScriptResult<E::Value, E::Value> {
        tracing::trace!(module = self.id(), "creating native module");
        match self {
            Self::Fs => fs::create_module(engine),
            Self::Os => os::create_module(engine),
            Self::Path => path::create_module(engine),
            Self::Util => util::create_module(engine),
        }
    }
}

impl fmt::Display for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for module in NativeModule::ALL {
            assert_eq!(NativeModule::from_id(module.id()), Some(module));
        }
        assert_eq!(NativeModule::from_id("http"), None);
        assert_eq!(NativeModule::Path.to_string(), "path");
    }
}
