//! Tick clock and task scheduler
//!
//! Everything in the engine runs on one logical tick thread. Frame deltas are
//! folded into whole ticks by [`GameClock`], and deferred work is expressed as
//! tasks on a [`Scheduler`] that fire on a given tick, never as sleeps.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

/// A point on the tick timeline
pub type Tick = u64;

/// Reference cadence: ticks per real second
pub const TICKS_PER_SECOND: u32 = 20;

/// Configuration for the tick clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Ticks per real second
    pub ticks_per_second: u32,
    /// Maximum delta time accepted per frame, to prevent a spiral of death
    pub max_delta_time: f32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            max_delta_time: 0.25,
        }
    }
}

impl TickConfig {
    /// Length of one tick in seconds
    pub fn tick_length(&self) -> f64 {
        1.0 / self.ticks_per_second.max(1) as f64
    }

    /// Convert seconds into whole ticks (rounded, at least one for positive input)
    pub fn seconds_to_ticks(&self, seconds: f32) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        ((seconds * self.ticks_per_second as f32).round() as u64).max(1)
    }
}

/// Real-time to tick conversion
#[derive(Debug, Clone)]
pub struct GameClock {
    pub config: TickConfig,
    /// Ticks elapsed since start
    pub tick: Tick,
    /// Whether the clock is paused
    pub paused: bool,
    accumulator: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(TickConfig::default())
    }
}

impl GameClock {
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            tick: 0,
            paused: false,
            accumulator: 0.0,
        }
    }

    /// Feed a raw frame delta (seconds) and get the number of ticks to run
    pub fn update(&mut self, raw_delta: f32) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator += raw_delta.clamp(0.0, self.config.max_delta_time) as f64;

        let step = self.config.tick_length();
        let mut steps = 0;
        while self.accumulator >= step {
            self.accumulator -= step;
            steps += 1;
        }
        self.tick += steps as u64;
        steps
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}

/// Token returned by [`Scheduler::schedule_once`] and friends; pass it back to
/// [`Scheduler::cancel`]. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

struct Task<E> {
    event: E,
    period: Option<u64>,
}

/// Tick-driven queue of one-shot and repeating tasks.
///
/// Tasks carry a plain event value; the owner of the scheduler dispatches the
/// events it pops. Cancelling removes the task immediately, so a cancelled
/// task is never popped afterwards even if it was already due.
pub struct Scheduler<E> {
    now: Tick,
    next_handle: u64,
    tasks: HashMap<TaskHandle, Task<E>>,
    /// (fire tick, handle); handle order doubles as insertion order
    queue: BinaryHeap<Reverse<(Tick, TaskHandle)>>,
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_handle: 1,
            tasks: HashMap::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.now
    }

    fn insert(&mut self, delay: u64, period: Option<u64>, event: E) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.insert(handle, Task { event, period });
        self.queue.push(Reverse((self.now.saturating_add(delay.max(1)), handle)));
        handle
    }

    /// Run `event` once, `delay` ticks from now (minimum one tick)
    pub fn schedule_once(&mut self, delay: u64, event: E) -> TaskHandle {
        self.insert(delay, None, event)
    }

    /// Run `event` every `period` ticks, first after `delay` ticks
    pub fn schedule_repeating(&mut self, delay: u64, period: u64, event: E) -> TaskHandle {
        self.insert(delay, Some(period.max(1)), event)
    }

    /// Cancel a task. Returns `true` if it was still scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(&handle).is_some()
    }

    /// Whether a task is still scheduled (not fired-once, not cancelled)
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Move the clock forward by one tick
    pub fn advance(&mut self) -> Tick {
        self.now += 1;
        self.now
    }

    /// Pop the next task due at or before the current tick.
    ///
    /// Repeating tasks are re-queued for their next period before being
    /// returned, so the caller may cancel them while handling the event.
    pub fn pop_due(&mut self) -> Option<(TaskHandle, E)> {
        loop {
            let Reverse((fire_at, handle)) = *self.queue.peek()?;
            if fire_at > self.now {
                return None;
            }
            self.queue.pop();

            // Stale heap entry for a cancelled task
            let Some(task) = self.tasks.get(&handle) else {
                continue;
            };
            let event = task.event.clone();
            match task.period {
                Some(period) => self.queue.push(Reverse((fire_at.saturating_add(period), handle))),
                None => {
                    self.tasks.remove(&handle);
                }
            }
            return Some((handle, event));
        }
    }

    /// Drop every task
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.queue.clear();
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, e)) = s.pop_due() {
            fired.push(e);
        }
        fired
    }

    #[test]
    fn test_clock_accumulates_whole_ticks() {
        let mut clock = GameClock::default();
        assert_eq!(clock.update(0.03), 0);
        assert_eq!(clock.update(0.03), 1);
        assert_eq!(clock.update(0.1), 2);
        assert_eq!(clock.tick, 3);

        clock.pause();
        assert_eq!(clock.update(0.2), 0);
    }

    #[test]
    fn test_clock_clamps_huge_deltas() {
        let mut clock = GameClock::default();
        assert_eq!(clock.update(10.0), 5);
    }

    #[test]
    fn test_seconds_to_ticks() {
        let config = TickConfig::default();
        assert_eq!(config.seconds_to_ticks(3.0), 60);
        assert_eq!(config.seconds_to_ticks(0.0), 0);
        assert_eq!(config.seconds_to_ticks(0.01), 1);
    }

    #[test]
    fn test_one_shot_fires_once_at_delay() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(3, "boom");
        s.advance();
        s.advance();
        assert!(drain(&mut s).is_empty());
        s.advance();
        assert_eq!(drain(&mut s), vec!["boom"]);
        assert!(!s.is_scheduled(h));
        s.advance();
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn test_repeating_fires_every_period() {
        let mut s = Scheduler::new();
        s.schedule_repeating(2, 2, "tick");
        let mut count = 0;
        for _ in 0..10 {
            s.advance();
            count += drain(&mut s).len();
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_cancelled_task_never_fires_even_when_due() {
        let mut s = Scheduler::new();
        let a = s.schedule_once(1, "a");
        let b = s.schedule_once(1, "b");
        s.advance();
        let (first, event) = s.pop_due().unwrap();
        assert_eq!(first, a);
        assert_eq!(event, "a");
        assert!(s.cancel(b));
        assert!(s.pop_due().is_none());
        assert!(!s.cancel(b), "second cancel reports nothing to cancel");
    }

    #[test]
    fn test_same_tick_tasks_pop_in_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_once(2, "first");
        s.schedule_once(2, "second");
        s.schedule_once(1, "earliest");
        s.advance();
        s.advance();
        assert_eq!(drain(&mut s), vec!["earliest", "first", "second"]);
    }

    #[test]
    fn test_zero_delay_is_clamped_to_next_tick() {
        let mut s = Scheduler::new();
        s.schedule_once(0, "now");
        assert!(s.pop_due().is_none());
        s.advance();
        assert_eq!(drain(&mut s), vec!["now"]);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut s = Scheduler::new();
        s.schedule_repeating(1, 1, "x");
        s.schedule_once(5, "y");
        s.clear();
        assert!(s.is_empty());
        for _ in 0..10 {
            s.advance();
            assert!(s.pop_due().is_none());
        }
    }

    #[test]
    fn test_huge_delays_saturate_instead_of_overflowing() {
        let mut s = Scheduler::new();
        let far = s.schedule_once(u64::MAX, "far");
        s.schedule_repeating(1, u64::MAX, "rare");
        s.advance();
        assert_eq!(drain(&mut s), vec!["rare"]);
        assert_eq!(s.len(), 2);
        assert!(s.is_scheduled(far));

        s.advance();
        assert!(drain(&mut s).is_empty());
    }
}
