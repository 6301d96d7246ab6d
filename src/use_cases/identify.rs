// Lookup/identify: turns lookup and search results into a candidate member or
// the mode-specific not-found feedback.

use crate::domain::{BackendError, InputMode, ResolvedMember};
use crate::use_cases::controller::KioskController;
use crate::use_cases::state::SearchResults;
use crate::use_cases::timers::TimerKey;
use crate::use_cases::types::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

impl KioskController {
    pub(super) fn lookup_finished(
        &mut self,
        mode: InputMode,
        value: String,
        result: Result<Option<ResolvedMember>, BackendError>,
        now: Instant,
    ) -> Vec<Command> {
        if mode == InputMode::Pin {
            self.state.pin_in_flight = false;
        }

        // Transport failures are handled exactly like an unknown member.
        let member = match result {
            Ok(member) => member,
            Err(err) => {
                warn!(%mode, error = %err, "lookup failed; treating as not found");
                None
            }
        };

        match member {
            Some(member) => {
                info!(%mode, partner_id = member.id, "member identified");
                self.open_overlay(member, now)
            }
            None => {
                debug!(%mode, value = %value, "no member for identifier");
                self.not_found(mode, now);
                Vec::new()
            }
        }
    }

    fn not_found(&mut self, mode: InputMode, now: Instant) {
        // Feedback only makes sense if the member is still on that input.
        if self.state.active_input_mode != mode || !self.state.is_on_input_screen() {
            return;
        }

        match mode {
            InputMode::Pin => {
                self.state.pin_error = true;
                self.timers
                    .arm(TimerKey::PinErrorReset, now, self.timings.pin_error);
            }
            InputMode::Barcode => {
                self.state.barcode_error_flash = true;
                self.timers
                    .arm(TimerKey::BarcodeErrorFlash, now, self.timings.barcode_flash);
            }
            InputMode::Name => {}
        }
    }

    pub(super) fn search_finished(
        &mut self,
        query: String,
        result: Result<Vec<ResolvedMember>, BackendError>,
    ) {
        let search = &mut self.state.name_search;
        if search.query.trim() != query {
            debug!(%query, "discarding results for a superseded query");
            return;
        }

        search.results = match result {
            Ok(members) if members.is_empty() => SearchResults::Empty,
            Ok(members) => SearchResults::Found(members),
            Err(err) => {
                warn!(error = %err, "member search failed");
                SearchResults::Empty
            }
        };
    }
}
