// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the runtime

use crate::engine::{ErrorKind, HostEngine};
use std::fmt;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Result type for operations that may surface a script exception
pub type ScriptResult<T, V> = std::result::Result<T, Exception<V>>;

/// Errors raised by the runtime itself
#[derive(Debug, Error)]
pub enum NodeError {
    /// Wrong argument count or type passed to a runtime function
    #[error("TypeError: {0}")]
    TypeError(String),

    /// The host refused to allocate a resource (e.g. a timer)
    #[error("Error: {0}")]
    Resource(String),

    /// Module not found
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Module resolution error
    #[error("Error resolving module '{module}': {reason}")]
    ModuleResolution {
        /// Module specifier
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl NodeError {
    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a resource allocation error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// The script-visible error constructor this error maps to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeError(_) => ErrorKind::TypeError,
            _ => ErrorKind::Error,
        }
    }

    /// Message without the constructor-name prefix
    pub fn message(&self) -> String {
        match self {
            Self::TypeError(msg) | Self::Resource(msg) | Self::Generic(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Build the script-visible exception value for this error
    pub fn to_value<E: HostEngine>(&self, engine: &mut E) -> E::Value {
        engine.new_error(self.kind(), &self.message())
    }
}

/// A failure that is about to cross into script space.
///
/// Either an error produced by the runtime, which still has to be turned
/// into an engine value, or a value the engine has already thrown.
#[derive(Debug)]
pub enum Exception<V> {
    /// Raised by the runtime
    Native(NodeError),
    /// Thrown by script code
    Thrown(V),
}

impl<V> Exception<V> {
    /// Convert into the engine value that should be thrown
    pub fn into_value<E: HostEngine<Value = V>>(self, engine: &mut E) -> V {
        match self {
            Self::Native(err) => err.to_value(engine),
            Self::Thrown(value) => value,
        }
    }

    /// Human-readable description, using the engine to render thrown values
    pub fn describe<E: HostEngine<Value = V>>(&self, engine: &mut E) -> String {
        match self {
            Self::Native(err) => err.to_string(),
            Self::Thrown(value) => format!("Uncaught {}", engine.display(value)),
        }
    }

    /// The runtime error, if this did not come from script code
    pub fn as_native(&self) -> Option<&NodeError> {
        match self {
            Self::Native(err) => Some(err),
            Self::Thrown(_) => None,
        }
    }
}

impl<V> From<NodeError> for Exception<V> {
    fn from(err: NodeError) -> Self {
        Self::Native(err)
    }
}

impl<V: fmt::Debug> fmt::Display for Exception<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(err) => write!(f, "{}", err),
            Self::Thrown(value) => write!(f, "Uncaught {:?}", value),
        }
    }
}

impl<V: fmt::Debug> std::error::Error for Exception<V> {}
