// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Core runtime implementation

mod event_loop;
mod instance;
mod node_runtime;
mod scheduler;

pub use event_loop::{EventLoop, HostEventLoop, LoopEvent, TickId, TimerId};
pub use instance::RuntimeInstance;
pub use node_runtime::Runtime;
pub use scheduler::{Scheduler, normalize_delay};
