// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration

use crate::error::{NodeError, Result};
use crate::runtime::EventLoop;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "EMBERNODE_";

/// Configuration for one runtime instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Value of `process.argv`
    pub argv: Vec<String>,

    /// Directory top-level relative requires resolve against (defaults to the cwd)
    pub base_dir: Option<PathBuf>,

    /// Leave the event loop once nothing is pending.
    ///
    /// Off by default: the loop runs until it is stopped, the way a host
    /// application's loop would.
    pub exit_when_idle: bool,

    /// Maximum number of live timers before setTimeout/setInterval fail
    pub max_timers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            argv: Vec::new(),
            base_dir: None,
            exit_when_idle: false,
            max_timers: EventLoop::DEFAULT_MAX_TIMERS,
        }
    }
}

impl RuntimeConfig {
    /// Load a JSON configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `EMBERNODE_*` overrides from the process environment
    pub fn load_from_env(&mut self) -> Result<()> {
        self.apply_env(std::env::vars())
    }

    /// Apply overrides from `(name, value)` pairs; names without the prefix are skipped
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, &value)?;
            }
        }
        Ok(())
    }

    /// Set a configuration value by its dashed name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "exit-when-idle" => self.exit_when_idle = parse_bool(key, value)?,
            "max-timers" => {
                self.max_timers = value
                    .parse()
                    .map_err(|_| NodeError::Config(format!("{key}: expected a number, got '{value}'")))?;
            }
            "base-dir" => self.base_dir = Some(PathBuf::from(value)),
            _ => tracing::debug!(key, "ignoring unknown configuration key"),
        }
        Ok(())
    }

    /// Builder-style setter for `argv`
    pub fn with_argv(mut self, argv: Vec<String>) -> Self {
        self.argv = argv;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(NodeError::Config(format!(
            "{key}: expected a boolean, got '{value}'"
        ))),
    }
}
