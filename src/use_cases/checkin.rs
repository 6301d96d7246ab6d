// Check-in submission and the confirmation screen that follows it.

use crate::domain::{BackendError, CheckinOutcome};
use crate::use_cases::controller::KioskController;
use crate::use_cases::state::Screen;
use crate::use_cases::timers::TimerKey;
use crate::use_cases::types::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

impl KioskController {
    pub(super) fn confirm_checkin(&mut self) -> Vec<Command> {
        if !self.state.checkin_enabled() {
            return Vec::new();
        }
        let Some(partner_id) = self.state.current_candidate_member.as_ref().map(|m| m.id) else {
            return Vec::new();
        };
        let session_id = self.state.checkin_session_id();

        if let Some(overlay) = self.state.overlay_mut() {
            overlay.submitting = true;
        }
        // The member is waiting on us now; inactivity no longer applies.
        self.timers.cancel(TimerKey::OverlayIdle);

        debug!(partner_id, ?session_id, "submitting check-in");
        vec![Command::Checkin {
            partner_id,
            session_id,
        }]
    }

    pub(super) fn checkin_finished(
        &mut self,
        partner_id: u64,
        result: Result<CheckinOutcome, BackendError>,
        now: Instant,
    ) {
        let submitting = self.state.overlay().is_some_and(|overlay| overlay.submitting);
        let member = match &self.state.current_candidate_member {
            Some(member) if submitting && member.id == partner_id => member,
            _ => {
                debug!(partner_id, "check-in result for a flow that has moved on");
                return;
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome.completed_with(member),
            Err(err) => {
                warn!(partner_id, error = %err, "check-in call failed");
                CheckinOutcome::transport_failure(member)
            }
        };
        info!(partner_id, status = outcome.status.as_str(), "check-in finished");

        self.state.screen = Screen::Confirmation(outcome);
        self.timers
            .arm(TimerKey::ConfirmDismiss, now, self.timings.confirm_dismiss);
    }
}
