// Class-selection overlay for an identified member.
//
// Loading -> Populated (auto-selecting a lone selectable session) or Failed.
// The overlay stays open on load failure so staff can still help; it closes on
// "not me" or after a period without interaction.

use crate::domain::{BackendError, MemberInfo, ResolvedMember};
use crate::use_cases::controller::KioskController;
use crate::use_cases::state::{ClassOverlay, OverlayLoad, Screen};
use crate::use_cases::timers::TimerKey;
use crate::use_cases::types::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

impl KioskController {
    pub(super) fn open_overlay(&mut self, member: ResolvedMember, now: Instant) -> Vec<Command> {
        let partner_id = member.id;

        self.state.current_candidate_member = Some(member);
        self.state.selected_class_session_id = None;
        self.close_gate();
        self.state.screen = Screen::ClassSelect(ClassOverlay {
            load: OverlayLoad::Loading,
            submitting: false,
        });

        self.timers.cancel(TimerKey::ConfirmDismiss);
        self.timers
            .arm(TimerKey::OverlayIdle, now, self.timings.overlay_idle);

        vec![Command::FetchMemberInfo { partner_id }]
    }

    pub(super) fn member_info_loaded(
        &mut self,
        partner_id: u64,
        result: Result<MemberInfo, BackendError>,
    ) {
        let current = self.state.current_candidate_member.as_ref().map(|m| m.id);
        if current != Some(partner_id) {
            debug!(partner_id, "member info for a stale candidate; ignored");
            return;
        }
        let Some(overlay) = self.state.overlay_mut() else {
            return;
        };
        if overlay.load != OverlayLoad::Loading {
            return;
        }

        match result {
            Ok(info) => {
                let auto = info.auto_selection().map(|session| session.id);
                debug!(
                    partner_id,
                    sessions = info.sessions.len(),
                    history = info.history.len(),
                    "member info loaded"
                );
                overlay.load = OverlayLoad::Populated(info);
                if let Some(session_id) = auto {
                    info!(partner_id, session_id, "single class auto-selected");
                    self.state.selected_class_session_id = Some(session_id);
                }
            }
            Err(err) => {
                warn!(partner_id, error = %err, "could not load member sessions");
                overlay.load = OverlayLoad::Failed;
            }
        }
    }

    pub(super) fn select_class(&mut self, session_id: u64, now: Instant) {
        let Some(overlay) = self.state.overlay() else {
            return;
        };
        if overlay.submitting {
            return;
        }
        let OverlayLoad::Populated(info) = &overlay.load else {
            return;
        };

        match info.session(session_id).map(|s| (s.is_selectable(), s.is_full())) {
            Some((true, _)) => {
                self.state.selected_class_session_id = Some(session_id);
                self.timers
                    .arm(TimerKey::OverlayIdle, now, self.timings.overlay_idle);
            }
            Some((false, full)) => debug!(session_id, full, "session not selectable"),
            None => debug!(session_id, "unknown session selected"),
        }
    }

    pub(super) fn overlay_idle(&mut self) {
        match self.state.overlay() {
            Some(overlay) if !overlay.submitting => {
                info!("class selection timed out");
                self.reset_to_idle();
            }
            _ => {}
        }
    }
}
