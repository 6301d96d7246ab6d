// Cancellable scheduled tasks keyed by purpose.
//
// Timers are plain deadlines owned by the controller. The runtime sleeps until
// the earliest one and then asks the controller to fire whatever is due, so
// tests can drive time by passing instants.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    BarcodeFlush,
    BarcodeErrorFlash,
    PinSubmit,
    PinErrorReset,
    SearchDebounce,
    OverlayIdle,
    ConfirmDismiss,
    GateCooldown,
}

/// Durations for every timer the kiosk arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KioskTimings {
    pub barcode_idle: Duration,
    pub barcode_flash: Duration,
    pub pin_submit: Duration,
    pub pin_error: Duration,
    pub search_debounce: Duration,
    pub overlay_idle: Duration,
    pub confirm_dismiss: Duration,
    pub gate_cooldown: Duration,
}

impl Default for KioskTimings {
    fn default() -> Self {
        Self {
            barcode_idle: Duration::from_millis(1500),
            barcode_flash: Duration::from_millis(600),
            pin_submit: Duration::from_millis(400),
            pin_error: Duration::from_millis(2000),
            search_debounce: Duration::from_millis(300),
            overlay_idle: Duration::from_secs(60),
            confirm_dismiss: Duration::from_secs(5),
            gate_cooldown: Duration::from_millis(1800),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: HashMap<TimerKey, Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `key` to fire `delay` after `now`, replacing any earlier arming.
    pub fn arm(&mut self, key: TimerKey, now: Instant, delay: Duration) {
        self.deadlines.insert(key, now + delay);
    }

    pub fn cancel(&mut self, key: TimerKey) {
        self.deadlines.remove(&key);
    }

    pub fn cancel_all(&mut self, keys: &[TimerKey]) {
        for key in keys {
            self.cancel(*key);
        }
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns the timers due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut due: Vec<(Instant, TimerKey)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}
