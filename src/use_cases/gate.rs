// Staff gates: PIN pads that unlock the instructor surface or exit the kiosk.
//
// Instructor PINs are checked by the ERP; the exit PIN is a local setting.
// Each instructor verification carries an attempt id so an answer for an
// abandoned gate never lands on a newer one.

use crate::domain::BackendError;
use crate::use_cases::controller::KioskController;
use crate::use_cases::state::{GatePurpose, PIN_LENGTH, StaffGate};
use crate::use_cases::timers::TimerKey;
use crate::use_cases::types::{Command, PinKey};
use std::time::Instant;
use tracing::{debug, info, warn};

impl KioskController {
    pub(super) fn open_gate(&mut self, purpose: GatePurpose) {
        if self.state.is_on_input_screen() && self.state.gate.is_none() {
            self.state.gate = Some(StaffGate::new(purpose));
        }
    }

    /// Drops any open gate along with its cooldown.
    pub(super) fn close_gate(&mut self) {
        self.state.gate = None;
        self.timers.cancel(TimerKey::GateCooldown);
    }

    pub(super) fn gate_key(&mut self, key: PinKey, now: Instant) -> Vec<Command> {
        let Some(gate) = self.state.gate.as_mut() else {
            return Vec::new();
        };
        if gate.verifying || gate.error {
            return Vec::new();
        }

        match key {
            PinKey::Digit(d) if d <= 9 && gate.digits.len() < PIN_LENGTH => {
                gate.digits.push(char::from(b'0' + d));
            }
            PinKey::Digit(_) => return Vec::new(),
            PinKey::Back => {
                gate.digits.pop();
                return Vec::new();
            }
        }
        if gate.digits.len() < PIN_LENGTH {
            return Vec::new();
        }

        match gate.purpose {
            GatePurpose::Instructor => {
                self.gate_attempts += 1;
                let attempt = self.gate_attempts;
                gate.verifying = true;
                gate.attempt = Some(attempt);
                vec![Command::InstructorAuth {
                    attempt,
                    pin: gate.digits.clone(),
                }]
            }
            GatePurpose::Exit => {
                let accepted = gate.digits == self.exit_pin;
                self.gate_verdict(Ok(accepted), now);
                Vec::new()
            }
        }
    }

    pub(super) fn gate_auth_finished(
        &mut self,
        attempt: u64,
        result: Result<bool, BackendError>,
        now: Instant,
    ) {
        let current = self
            .state
            .gate
            .as_ref()
            .filter(|gate| gate.verifying)
            .and_then(|gate| gate.attempt);
        if current != Some(attempt) {
            debug!(attempt, "instructor auth answer for an abandoned gate; ignored");
            return;
        }
        self.gate_verdict(result, now);
    }

    fn gate_verdict(&mut self, result: Result<bool, BackendError>, now: Instant) {
        let Some(gate) = self.state.gate.as_mut() else {
            return;
        };
        gate.verifying = false;
        gate.attempt = None;
        let purpose = gate.purpose;

        match result {
            Ok(true) => {
                info!(gate = purpose.as_str(), "staff PIN accepted");
                self.close_gate();
                self.state.navigation = Some(purpose.destination());
            }
            Ok(false) => {
                warn!(gate = purpose.as_str(), "staff PIN rejected");
                gate.error = true;
                self.timers
                    .arm(TimerKey::GateCooldown, now, self.timings.gate_cooldown);
            }
            Err(err) => {
                warn!(error = %err, "instructor auth call failed");
                gate.error = true;
                self.timers
                    .arm(TimerKey::GateCooldown, now, self.timings.gate_cooldown);
            }
        }
    }

    pub(super) fn gate_cooldown_elapsed(&mut self) {
        if let Some(gate) = self.state.gate.as_mut() {
            gate.digits.clear();
            gate.error = false;
        }
    }
}
