// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Event loop implementation
//!
//! Two tiers of events:
//! - posted events (next-tick), always delivered first and in FIFO order
//! - timers, delivered once due, earliest deadline first
//!
//! The loop only hands out [`LoopEvent`]s. Whoever drives it dispatches
//! them; callbacks never live here.
//!
//! Deadlines are [`tokio::time::Instant`]s so that paused test time and
//! `wait` agree on what is due.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Timer ids are unique across every loop in the process
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a posted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// A notification handed back by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// A timer came due
    Timer(TimerId),
    /// A posted event reached the front of the queue
    Posted(TickId),
}

/// The timer and event-posting facilities the scheduler relies on.
///
/// Implemented by [`EventLoop`]; an embedder with its own loop (a GUI
/// toolkit, say) can implement it instead and route notifications back
/// through [`crate::runtime::RuntimeInstance::dispatch`].
pub trait HostEventLoop {
    /// Start a timer. `None` if the loop cannot allocate one.
    fn start_timer(&self, delay: Duration, repeating: bool) -> Option<TimerId>;

    /// Cancel a timer; unknown ids are ignored
    fn kill_timer(&self, id: TimerId);

    /// Queue a posted event below nothing but the current call stack
    fn post_event(&self, tick: TickId);
}

/// A live timer
#[derive(Debug, Clone, Copy)]
struct Timer {
    deadline: Instant,
    repeat: Option<Duration>,
}

/// `queue` holds exactly one `(deadline, id)` entry per live timer
#[derive(Debug, Default)]
struct TimerState {
    live: HashMap<TimerId, Timer>,
    queue: BTreeSet<(Instant, TimerId)>,
}

/// The main event loop
pub struct EventLoop {
    /// Live timers and their deadlines
    timers: Mutex<TimerState>,
    /// Posted events
    posted: Mutex<VecDeque<TickId>>,
    /// Maximum number of live timers
    max_timers: usize,
    /// Set once the loop has been asked to stop
    stopped: AtomicBool,
    /// Wakes a pending `wait`
    wakeup: Notify,
}

impl EventLoop {
    /// Default live-timer capacity
    pub const DEFAULT_MAX_TIMERS: usize = 65_536;

    /// Create a new event loop
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_TIMERS)
    }

    /// Create an event loop that refuses to hold more than `max_timers` live timers
    pub fn with_capacity(max_timers: usize) -> Self {
        Self {
            timers: Mutex::new(TimerState::default()),
            posted: Mutex::new(VecDeque::new()),
            max_timers,
            stopped: AtomicBool::new(false),
            wakeup: Notify::new(),
        }
    }

    /// Generate a new process-unique timer ID
    fn next_id(&self) -> TimerId {
        TimerId(NEXT_TIMER_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Start a timer relative to `now`
    pub fn start_timer_at(&self, now: Instant, delay: Duration, repeating: bool) -> Option<TimerId> {
        let mut timers = self.timers.lock();
        if timers.live.len() >= self.max_timers {
            return None;
        }

        let id = self.next_id();
        let deadline = now + delay;
        timers.live.insert(
            id,
            Timer {
                deadline,
                repeat: repeating.then_some(delay),
            },
        );
        timers.queue.insert((deadline, id));
        Some(id)
    }

    /// Next event ready at `now`, posted events first.
    ///
    /// A repeating timer is re-armed one interval after the deadline it
    /// just met; if that is already past, missed runs are coalesced and it
    /// is re-armed one interval after `now`.
    pub fn poll_event(&self, now: Instant) -> Option<LoopEvent> {
        if let Some(tick) = self.posted.lock().pop_front() {
            return Some(LoopEvent::Posted(tick));
        }

        let mut timers = self.timers.lock();
        let &(at, id) = timers.queue.first()?;
        if at > now {
            return None;
        }
        timers.queue.remove(&(at, id));

        let repeat = timers.live.get(&id).and_then(|timer| timer.repeat);
        match repeat {
            Some(interval) => {
                let mut next = at + interval;
                if next <= now {
                    next = now + interval;
                }
                timers.live.insert(
                    id,
                    Timer {
                        deadline: next,
                        repeat: Some(interval),
                    },
                );
                timers.queue.insert((next, id));
            }
            None => {
                timers.live.remove(&id);
            }
        }
        Some(LoopEvent::Timer(id))
    }

    /// Earliest live timer deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.lock().queue.first().map(|&(at, _)| at)
    }

    /// Whether any posted event is queued
    pub fn has_posted(&self) -> bool {
        !self.posted.lock().is_empty()
    }

    /// Number of live timers
    pub fn live_timers(&self) -> usize {
        self.timers.lock().live.len()
    }

    /// Whether `id` is a live timer
    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.lock().live.contains_key(&id)
    }

    /// Nothing queued and no live timers
    pub fn is_idle(&self) -> bool {
        !self.has_posted() && self.live_timers() == 0
    }

    /// Wait until the next timer is due, a posted event is queued, or the
    /// loop is stopped
    pub async fn wait(&self) {
        if self.is_stopped() || self.has_posted() {
            return;
        }

        match self.next_deadline() {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {}
                    _ = self.wakeup.notified() => {}
                }
            }
            None => self.wakeup.notified().await,
        }
    }

    /// Stop the event loop
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::SeqCst);
        self.wakeup.notify_one();
    }

    /// Check if the loop was stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::SeqCst)
    }
}

impl HostEventLoop for EventLoop {
    fn start_timer(&self, delay: Duration, repeating: bool) -> Option<TimerId> {
        self.start_timer_at(Instant::now(), delay, repeating)
    }

    fn kill_timer(&self, id: TimerId) {
        let mut timers = self.timers.lock();
        if let Some(timer) = timers.live.remove(&id) {
            timers.queue.remove(&(timer.deadline, id));
        }
    }

    fn post_event(&self, tick: TickId) {
        self.posted.lock().push_back(tick);
        self.wakeup.notify_one();
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("live_timers", &self.live_timers())
            .field("posted", &self.posted.lock().len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
