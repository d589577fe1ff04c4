// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # embernode-runtime
//!
//! A Node.js-style runtime layer for JavaScript engines that live inside a
//! larger host application.
//!
//! The crate does not ship an engine of its own. It attaches to any engine
//! implementing [`engine::HostEngine`] and provides:
//!
//! - CommonJS `require()` with a per-runtime module cache and reserved
//!   native module ids (`fs`, `os`, `path`, `util`)
//! - `setTimeout` / `setInterval` / `clearTimeout` / `clearInterval` and
//!   `process.nextTick`, multiplexed onto one event loop where next-ticks
//!   always run before the next timer
//! - errno-style exceptions for OS failures
//! - an [`EngineRegistry`] that maps an engine back to its runtime, so
//!   native functions need nothing but the engine they are called with
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use embernode_runtime::{Runtime, RuntimeConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut engine = MyEngine::new(InstanceRegistry::shared());
//!     let runtime = Runtime::new(&mut engine, RuntimeConfig::default()).unwrap();
//!     runtime.require(&mut engine, "./main.js").unwrap();
//!     let code = runtime.run_event_loop(&mut engine).await.unwrap();
//!     std::process::exit(code);
//! }
//! ```
//!
//! With the `boa` feature, `boa_engine::Context` implements `HostEngine`
//! out of the box (see the `engine::boa` module).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod errno;
pub mod error;
pub mod globals;
pub mod module_system;
pub mod modules;
pub mod registry;
pub mod runtime;

// Re-exports
pub use config::RuntimeConfig;
pub use engine::{EngineId, HostEngine, InstanceRegistry};
pub use error::{Exception, NodeError, Result, ScriptResult};
pub use registry::EngineRegistry;
pub use runtime::{EventLoop, Runtime, RuntimeInstance, TimerId};

/// Version of the embernode runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
