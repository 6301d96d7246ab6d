// Input channel adapters: barcode keystrokes, the member PIN pad and the
// debounced name search.

use crate::domain::InputMode;
use crate::use_cases::controller::KioskController;
use crate::use_cases::state::{MIN_BARCODE_LENGTH, NameSearch, PIN_LENGTH, SearchResults};
use crate::use_cases::timers::TimerKey;
use crate::use_cases::types::{Command, Key, PinKey};
use std::time::Instant;
use tracing::debug;

impl KioskController {
    pub(super) fn barcode_key(&mut self, key: Key, now: Instant) -> Vec<Command> {
        if self.state.active_input_mode != InputMode::Barcode || self.state.gate.is_some() {
            return Vec::new();
        }

        match key {
            Key::Char(c) => {
                self.state.barcode_accumulator.push(c);
                self.timers
                    .arm(TimerKey::BarcodeFlush, now, self.timings.barcode_idle);
                Vec::new()
            }
            Key::Enter => {
                self.timers.cancel(TimerKey::BarcodeFlush);
                let code = self.state.barcode_accumulator.trim().to_string();
                self.state.barcode_accumulator.clear();

                if code.chars().count() < MIN_BARCODE_LENGTH {
                    debug!(len = code.len(), "barcode too short; ignored");
                    return Vec::new();
                }
                debug!(barcode = %code, "barcode scanned");
                vec![Command::Lookup {
                    mode: InputMode::Barcode,
                    value: code,
                }]
            }
            Key::Modifier | Key::Other => Vec::new(),
        }
    }

    pub(super) fn set_mode(&mut self, mode: InputMode) {
        if !self.state.is_on_input_screen() || self.state.gate.is_some() {
            return;
        }

        self.state.active_input_mode = mode;
        self.timers.cancel_all(&[
            TimerKey::BarcodeFlush,
            TimerKey::PinSubmit,
            TimerKey::PinErrorReset,
            TimerKey::SearchDebounce,
        ]);

        match mode {
            InputMode::Barcode => self.state.barcode_accumulator.clear(),
            InputMode::Pin => self.reset_pin(),
            InputMode::Name => self.state.name_search = NameSearch::default(),
        }
        debug!(%mode, "input mode changed");
    }

    pub(super) fn pin_key(&mut self, key: PinKey, now: Instant) {
        let state = &mut self.state;
        if state.active_input_mode != InputMode::Pin
            || !state.is_on_input_screen()
            || state.gate.is_some()
            || state.pin_in_flight
        {
            return;
        }

        // A key press during the error display starts a fresh entry.
        if state.pin_error {
            self.reset_pin();
        }

        match key {
            PinKey::Digit(d) if d <= 9 => {
                if self.state.pending_pin_digits.len() >= PIN_LENGTH {
                    return;
                }
                self.state.pending_pin_digits.push(char::from(b'0' + d));
                if self.state.pending_pin_digits.len() == PIN_LENGTH {
                    self.timers
                        .arm(TimerKey::PinSubmit, now, self.timings.pin_submit);
                }
            }
            PinKey::Digit(_) => {}
            PinKey::Back => {
                self.state.pending_pin_digits.pop();
                self.timers.cancel(TimerKey::PinSubmit);
            }
        }
    }

    pub(super) fn submit_pin(&mut self) -> Option<Command> {
        let state = &mut self.state;
        if state.active_input_mode != InputMode::Pin
            || !state.is_on_input_screen()
            || state.pending_pin_digits.len() != PIN_LENGTH
        {
            return None;
        }

        state.pin_in_flight = true;
        Some(Command::Lookup {
            mode: InputMode::Pin,
            value: state.pending_pin_digits.clone(),
        })
    }

    pub(super) fn reset_pin(&mut self) {
        self.state.pending_pin_digits.clear();
        self.state.pin_error = false;
        self.state.pin_in_flight = false;
        self.timers
            .cancel_all(&[TimerKey::PinSubmit, TimerKey::PinErrorReset]);
    }

    pub(super) fn name_input(&mut self, text: String, now: Instant) {
        if self.state.active_input_mode != InputMode::Name
            || !self.state.is_on_input_screen()
            || self.state.gate.is_some()
        {
            return;
        }

        self.timers.cancel(TimerKey::SearchDebounce);
        let blank = text.trim().is_empty();
        self.state.name_search.query = text;

        if blank {
            self.state.name_search.results = SearchResults::Idle;
        } else {
            self.timers
                .arm(TimerKey::SearchDebounce, now, self.timings.search_debounce);
        }
    }

    pub(super) fn clear_name(&mut self) {
        self.timers.cancel(TimerKey::SearchDebounce);
        self.state.name_search = NameSearch::default();
    }

    pub(super) fn start_search(&mut self) -> Option<Command> {
        let query = self.state.name_search.query.trim().to_string();
        if query.is_empty() || !self.state.is_on_input_screen() {
            return None;
        }

        self.state.name_search.results = SearchResults::Loading;
        Some(Command::Search {
            query,
            session_id: self.state.terminal_session_id,
        })
    }
}
