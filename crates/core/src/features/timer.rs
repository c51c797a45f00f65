//! Pomodoro-style focus timer.
//!
//! The state is plain data persisted after every change, so a restart picks
//! up where the last tick left off.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::store::{KeyValueStore, LocalStore, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    fn other(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Work => f.write_str("work"),
            TimerMode::Break => f.write_str("break"),
        }
    }
}

/// Persisted timer state.
///
/// `work` and `brk` are phase lengths in minutes; `secs` is what remains of
/// the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimerState {
    pub mode: TimerMode,
    pub secs: u32,
    pub work: u32,
    pub brk: u32,
    pub running: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self { mode: TimerMode::Work, secs: 25 * 60, work: 25, brk: 5, running: false }
    }
}

impl TimerState {
    fn phase_secs(&self, mode: TimerMode) -> u32 {
        let minutes = match mode {
            TimerMode::Work => self.work,
            TimerMode::Break => self.brk,
        };
        minutes.saturating_mul(60)
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and rewind to the start of a work phase.
    pub fn reset(&mut self) {
        self.running = false;
        self.mode = TimerMode::Work;
        self.secs = self.phase_secs(TimerMode::Work);
    }

    /// Set the work length (at least one minute).
    pub fn set_work_minutes(&mut self, minutes: u32) {
        self.work = minutes.max(1);
        if self.mode == TimerMode::Work {
            self.secs = self.phase_secs(TimerMode::Work);
        }
    }

    /// Set the break length (at least one minute).
    pub fn set_break_minutes(&mut self, minutes: u32) {
        self.brk = minutes.max(1);
        if self.mode == TimerMode::Break {
            self.secs = self.phase_secs(TimerMode::Break);
        }
    }

    /// Advance one second. Returns the new mode when a phase ends.
    pub fn tick(&mut self) -> Option<TimerMode> {
        if !self.running {
            return None;
        }

        self.secs = self.secs.saturating_sub(1);
        if self.secs > 0 {
            return None;
        }

        self.mode = self.mode.other();
        self.secs = self.phase_secs(self.mode);
        Some(self.mode)
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.secs / 60, self.secs % 60)
    }
}

/// Timer operations over the local store.
pub struct FocusTimer<'a, S: KeyValueStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KeyValueStore> FocusTimer<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    pub fn state(&self) -> TimerState {
        self.store.get(keys::TIMER, TimerState::default())
    }

    /// Load, change and persist the state under the store's write lock.
    pub fn update<R>(&self, change: impl FnOnce(&mut TimerState) -> R) -> Result<(TimerState, R), Error> {
        self.store.update(keys::TIMER, TimerState::default(), |state| {
            let out = change(state);
            Ok((state.clone(), out))
        })
    }

    /// One-second tick; a stopped timer is left untouched in storage.
    ///
    /// A pause that lands between the running check and the tick wins: the
    /// tick re-reads the state under the lock and leaves it alone.
    pub fn tick(&self) -> Result<(TimerState, Option<TimerMode>), Error> {
        let state = self.state();
        if !state.running {
            return Ok((state, None));
        }
        self.update(TimerState::tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_default_state() {
        let state = TimerState::default();
        assert_eq!(state.mode, TimerMode::Work);
        assert_eq!(state.display(), "25:00");
        assert!(!state.running);
    }

    #[test]
    fn test_tick_only_when_running() {
        let mut state = TimerState::default();
        assert_eq!(state.tick(), None);
        assert_eq!(state.secs, 1500);

        state.start();
        assert_eq!(state.tick(), None);
        assert_eq!(state.display(), "24:59");
    }

    #[test]
    fn test_tick_switches_phase() {
        let mut state = TimerState { secs: 1, running: true, ..Default::default() };
        assert_eq!(state.tick(), Some(TimerMode::Break));
        assert_eq!(state.mode, TimerMode::Break);
        assert_eq!(state.secs, 5 * 60);

        state.secs = 1;
        assert_eq!(state.tick(), Some(TimerMode::Work));
        assert_eq!(state.secs, 25 * 60);
        assert!(state.running);
    }

    #[test]
    fn test_reset() {
        let mut state = TimerState { mode: TimerMode::Break, secs: 42, work: 30, brk: 10, running: true };
        state.reset();
        assert_eq!(state, TimerState { mode: TimerMode::Work, secs: 1800, work: 30, brk: 10, running: false });
    }

    #[test]
    fn test_minute_setters_clamp_and_apply_to_current_mode() {
        let mut state = TimerState::default();
        state.set_work_minutes(0);
        assert_eq!(state.work, 1);
        assert_eq!(state.secs, 60);

        state.set_break_minutes(10);
        assert_eq!(state.brk, 10);
        assert_eq!(state.secs, 60, "break length does not touch a running work phase");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(TimerState::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "mode": "work", "secs": 1500, "work": 25, "brk": 5, "running": false }));
    }

    #[test]
    fn test_focus_timer_persists() {
        let store = LocalStore::new(MemoryStorage::new());
        let timer = FocusTimer::new(&store);

        timer.update(TimerState::start).unwrap();
        let (state, switched) = timer.tick().unwrap();
        assert_eq!(switched, None);
        assert_eq!(state.secs, 1499);
        assert_eq!(timer.state(), state);
    }

    #[test]
    fn test_concurrent_ticks_and_pause_do_not_interleave() {
        let store = LocalStore::new(MemoryStorage::new());
        FocusTimer::new(&store).update(TimerState::start).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        FocusTimer::new(&store).tick().unwrap();
                    }
                });
            }
        });
        assert_eq!(FocusTimer::new(&store).state().secs, 1500 - 200);

        FocusTimer::new(&store).update(TimerState::pause).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| FocusTimer::new(&store).tick().unwrap());
            }
        });
        let state = FocusTimer::new(&store).state();
        assert!(!state.running);
        assert_eq!(state.secs, 1300);
    }

    #[test]
    fn test_focus_timer_stopped_tick_does_not_write() {
        let store = LocalStore::new(MemoryStorage::new());
        let (state, switched) = FocusTimer::new(&store).tick().unwrap();
        assert_eq!(switched, None);
        assert_eq!(state, TimerState::default());
        assert_eq!(store.backend().get_item(keys::TIMER).unwrap(), None);
    }
}
