// Kiosk check-in controller: pure state transitions.
//
// Every entry point takes the current instant and returns the remote calls the
// runtime must start. Nothing here performs I/O or reads the clock.

use crate::domain::InputMode;
use crate::use_cases::state::{DEFAULT_EXIT_PIN, GatePurpose, KioskState, Screen};
use crate::use_cases::timers::{KioskTimings, TimerKey, Timers};
use crate::use_cases::types::{Command, Completion, KioskInput};
use std::time::Instant;
use tracing::debug;

// Timers tied to a member flow; the gate cooldown lives on its own.
const FLOW_TIMERS: &[TimerKey] = &[
    TimerKey::BarcodeFlush,
    TimerKey::BarcodeErrorFlash,
    TimerKey::PinSubmit,
    TimerKey::PinErrorReset,
    TimerKey::SearchDebounce,
    TimerKey::OverlayIdle,
    TimerKey::ConfirmDismiss,
];

#[derive(Debug, Clone)]
pub struct KioskController {
    pub(super) state: KioskState,
    pub(super) timers: Timers,
    pub(super) timings: KioskTimings,
    pub(super) exit_pin: String,
    // Last staff PIN verification issued; answers for older ones are dropped.
    pub(super) gate_attempts: u64,
}

impl KioskController {
    pub fn new(mode: InputMode, terminal_session_id: Option<u64>, timings: KioskTimings) -> Self {
        Self {
            state: KioskState::new(mode, terminal_session_id),
            timers: Timers::new(),
            timings,
            exit_pin: DEFAULT_EXIT_PIN.to_string(),
            gate_attempts: 0,
        }
    }

    /// Replaces the PIN that unlocks the exit gate.
    pub fn with_exit_pin(mut self, pin: impl Into<String>) -> Self {
        self.exit_pin = pin.into();
        self
    }

    pub fn state(&self) -> &KioskState {
        &self.state
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn handle_input(&mut self, input: KioskInput, now: Instant) -> Vec<Command> {
        // A raised navigation is consumed by the first thing that happens next.
        self.state.navigation = None;

        match input {
            KioskInput::Key(key) => self.barcode_key(key, now),
            KioskInput::SetMode(mode) => {
                self.set_mode(mode);
                Vec::new()
            }
            KioskInput::PinKey(key) => {
                self.pin_key(key, now);
                Vec::new()
            }
            KioskInput::NameInput(text) => {
                self.name_input(text, now);
                Vec::new()
            }
            KioskInput::ClearName => {
                self.clear_name();
                Vec::new()
            }
            KioskInput::MemberTap(member) => {
                if !self.state.is_on_input_screen() {
                    return Vec::new();
                }
                self.open_overlay(member, now)
            }
            KioskInput::SelectClass(session_id) => {
                self.select_class(session_id, now);
                Vec::new()
            }
            KioskInput::ConfirmCheckin => self.confirm_checkin(),
            KioskInput::NotMe => {
                if self.state.overlay().is_some() {
                    debug!("overlay dismissed by member");
                    self.reset_to_idle();
                }
                Vec::new()
            }
            KioskInput::DismissConfirmation => {
                if matches!(self.state.screen, Screen::Confirmation(_)) {
                    self.reset_to_idle();
                }
                Vec::new()
            }
            KioskInput::SelectSession(session_id) => {
                self.state.terminal_session_id = session_id.filter(|id| *id != 0);
                debug!(session_id = ?self.state.terminal_session_id, "terminal session changed");
                Vec::new()
            }
            KioskInput::OpenInstructorGate => {
                self.open_gate(GatePurpose::Instructor);
                Vec::new()
            }
            KioskInput::OpenExitGate => {
                self.open_gate(GatePurpose::Exit);
                Vec::new()
            }
            KioskInput::GateKey(key) => self.gate_key(key, now),
            KioskInput::CloseGate => {
                self.close_gate();
                Vec::new()
            }
        }
    }

    pub fn handle_completion(&mut self, completion: Completion, now: Instant) -> Vec<Command> {
        match completion {
            Completion::Lookup {
                mode,
                value,
                result,
            } => self.lookup_finished(mode, value, result, now),
            Completion::Search { query, result } => {
                self.search_finished(query, result);
                Vec::new()
            }
            Completion::MemberInfo { partner_id, result } => {
                self.member_info_loaded(partner_id, result);
                Vec::new()
            }
            Completion::Checkin { partner_id, result } => {
                self.checkin_finished(partner_id, result, now);
                Vec::new()
            }
            Completion::InstructorAuth { attempt, result } => {
                self.gate_auth_finished(attempt, result, now);
                Vec::new()
            }
        }
    }

    /// Fires every timer due at `now`.
    pub fn fire_due(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        for key in self.timers.take_due(now) {
            debug!(timer = ?key, "timer fired");
            match key {
                TimerKey::BarcodeFlush => self.state.barcode_accumulator.clear(),
                TimerKey::BarcodeErrorFlash => self.state.barcode_error_flash = false,
                TimerKey::PinSubmit => commands.extend(self.submit_pin()),
                TimerKey::PinErrorReset => self.reset_pin(),
                TimerKey::SearchDebounce => commands.extend(self.start_search()),
                TimerKey::OverlayIdle => self.overlay_idle(),
                TimerKey::ConfirmDismiss => {
                    if matches!(self.state.screen, Screen::Confirmation(_)) {
                        self.reset_to_idle();
                    }
                }
                TimerKey::GateCooldown => self.gate_cooldown_elapsed(),
            }
        }
        commands
    }

    /// Clears all per-member state and returns to the base input mode.
    pub(super) fn reset_to_idle(&mut self) {
        self.timers.cancel_all(FLOW_TIMERS);
        self.state.clear_member_flow();
        debug!(mode = %self.state.active_input_mode, "returned to idle");
    }
}
