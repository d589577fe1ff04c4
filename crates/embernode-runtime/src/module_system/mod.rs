// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS module system
//!
//! - Native modules installed once per runtime
//! - User modules loaded through a pluggable [`ModuleResolver`], evaluated
//!   once and cached by canonical id
//! - `require()` / `require.resolve()`

mod cache;
mod require;
mod resolver;

pub use cache::{CachedModule, ModuleRegistry};
pub use require::{require, require_resolve};
pub use resolver::{FsResolver, ModuleResolver, ResolvedModule, is_path_specifier};
