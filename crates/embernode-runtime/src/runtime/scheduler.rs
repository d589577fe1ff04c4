// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Timer and next-tick bookkeeping
//!
//! The scheduler owns every callback between registration and firing (or
//! cancellation). The host loop only ever sees ids.

use crate::error::{NodeError, Result};
use crate::runtime::event_loop::{HostEventLoop, LoopEvent, TickId, TimerId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Largest delay accepted as-is, in milliseconds
const MAX_DELAY_MS: f64 = 2_147_483_647.0;

/// Normalize a script-supplied delay.
///
/// NaN, non-positive and out-of-range delays become 1 ms so a callback is
/// never run synchronously. Fractions are truncated.
pub fn normalize_delay(delay_ms: f64) -> Duration {
    if delay_ms.is_nan() || delay_ms > MAX_DELAY_MS {
        return Duration::from_millis(1);
    }
    let millis = delay_ms.trunc();
    if millis < 1.0 {
        Duration::from_millis(1)
    } else {
        Duration::from_millis(millis as u64)
    }
}

/// Live timers, intervals and pending next-ticks of one runtime
pub struct Scheduler<V> {
    event_loop: Arc<dyn HostEventLoop>,
    timeouts: HashMap<TimerId, V>,
    intervals: HashMap<TimerId, V>,
    ticks: HashMap<TickId, V>,
    next_tick_id: u64,
}

impl<V: Clone> Scheduler<V> {
    /// Create a scheduler driving `event_loop`
    pub fn new(event_loop: Arc<dyn HostEventLoop>) -> Self {
        Self {
            event_loop,
            timeouts: HashMap::new(),
            intervals: HashMap::new(),
            ticks: HashMap::new(),
            next_tick_id: 1,
        }
    }

    /// Register a one-shot callback
    pub fn set_timeout(&mut self, callback: V, delay_ms: f64) -> Result<TimerId> {
        let id = self.start(delay_ms, false, "setTimeout")?;
        self.timeouts.insert(id, callback);
        Ok(id)
    }

    /// Register a repeating callback
    pub fn set_interval(&mut self, callback: V, delay_ms: f64) -> Result<TimerId> {
        let id = self.start(delay_ms, true, "setInterval")?;
        self.intervals.insert(id, callback);
        Ok(id)
    }

    /// Cancel a one-shot timer; ids that are not live are ignored
    pub fn clear_timeout(&mut self, id: TimerId) {
        if self.timeouts.remove(&id).is_some() {
            self.event_loop.kill_timer(id);
            tracing::debug!(timer = %id, "timeout cleared");
        }
    }

    /// Cancel a repeating timer; ids that are not live are ignored
    pub fn clear_interval(&mut self, id: TimerId) {
        if self.intervals.remove(&id).is_some() {
            self.event_loop.kill_timer(id);
            tracing::debug!(timer = %id, "interval cleared");
        }
    }

    /// Queue a callback for the next-tick tier
    pub fn next_tick(&mut self, callback: V) -> TickId {
        let tick = TickId(self.next_tick_id);
        self.next_tick_id += 1;
        self.ticks.insert(tick, callback);
        self.event_loop.post_event(tick);
        tick
    }

    /// The callback to run for a host notification.
    ///
    /// One-shot timers and ticks are removed before their callback is handed
    /// out; intervals stay registered. Notifications for ids that are no
    /// longer live yield `None`.
    pub fn take_callback(&mut self, event: LoopEvent) -> Option<V> {
        match event {
            LoopEvent::Timer(id) => {
                if let Some(callback) = self.timeouts.remove(&id) {
                    self.event_loop.kill_timer(id);
                    return Some(callback);
                }
                if let Some(callback) = self.intervals.get(&id) {
                    return Some(callback.clone());
                }
                tracing::trace!(timer = %id, "notification for a timer that is no longer live");
                None
            }
            LoopEvent::Posted(tick) => {
                let callback = self.ticks.remove(&tick);
                if callback.is_none() {
                    tracing::trace!(tick = tick.0, "posted event without a pending tick");
                }
                callback
            }
        }
    }

    /// Whether `id` names a live timeout or interval
    pub fn is_live(&self, id: TimerId) -> bool {
        self.timeouts.contains_key(&id) || self.intervals.contains_key(&id)
    }

    /// Number of live one-shot timers
    pub fn live_timeouts(&self) -> usize {
        self.timeouts.len()
    }

    /// Number of live intervals
    pub fn live_intervals(&self) -> usize {
        self.intervals.len()
    }

    /// Number of next-ticks not yet run
    pub fn pending_ticks(&self) -> usize {
        self.ticks.len()
    }

    fn start(&self, delay_ms: f64, repeating: bool, function: &str) -> Result<TimerId> {
        let delay = normalize_delay(delay_ms);
        match self.event_loop.start_timer(delay, repeating) {
            Some(id) => {
                tracing::debug!(timer = %id, ?delay, repeating, "timer registered");
                Ok(id)
            }
            None => {
                tracing::warn!(function, "host event loop refused to start a timer");
                Err(NodeError::resource(format!("{function}: unable to start timer")))
            }
        }
    }
}

impl<V> fmt::Debug for Scheduler<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("timeouts", &self.timeouts.len())
            .field("intervals", &self.intervals.len())
            .field("ticks", &self.ticks.len())
            .finish()
    }
}
