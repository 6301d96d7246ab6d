// Rendering layer: maps a kiosk state snapshot to the view the front end draws.
// Pure; the clock string is passed in.

use crate::domain::member::{DEFAULT_BELT, belt_label};
use crate::domain::{AttendanceEntry, CheckinOutcome, ClassSessionCandidate, ResolvedMember};
use crate::interface_adapters::protocol::{
    BarcodeView, ConfirmationView, GateView, HistoryView, KioskView, MemberView, OverlayView,
    PinPadView, SearchView, SessionView,
};
use crate::use_cases::state::{
    ClassOverlay, KioskState, Navigation, OverlayLoad, PIN_LENGTH, Screen,
    SearchResults, StaffGate,
};

pub const INSTRUCTOR_SURFACE_PATH: &str = "/dojo/kiosk/instructor";
// ERP back office, where an unlocked exit gate leads.
pub const BACKEND_PATH: &str = "/odoo";

const NO_MEMBERS_FOUND: &str = "No members found — ask staff for help.";
const PIN_NOT_FOUND: &str = "PIN not found. Please try again.";
const GATE_REJECTED: &str = "Incorrect PIN";
const CLASSES_LOADING: &str = "Loading classes…";
const CLASSES_FAILED: &str = "Could not load classes";
const NO_CLASSES: &str = "No classes available right now";

const BELT_COLORS: &[&str] = &[
    "white", "yellow", "orange", "green", "blue", "purple", "brown", "red", "black",
];

pub fn render_view(state: &KioskState, clock: String) -> KioskView {
    let (screen, overlay, confirmation) = match &state.screen {
        Screen::Input => ("input", None, None),
        Screen::ClassSelect(overlay) => ("class_select", render_overlay(state, overlay), None),
        Screen::Confirmation(outcome) => (
            "confirmation",
            None,
            Some(render_confirmation(outcome, state.current_candidate_member.as_ref())),
        ),
    };

    KioskView {
        clock,
        mode: state.active_input_mode.as_str(),
        session_id: state.terminal_session_id,
        screen,
        barcode: BarcodeView {
            buffered: state.barcode_accumulator.chars().count(),
            error_flash: state.barcode_error_flash,
        },
        pin: PinPadView {
            dots: dots(&state.pending_pin_digits),
            verifying: state.pin_in_flight,
            error: state.pin_error,
            message: state.pin_error.then_some(PIN_NOT_FOUND),
        },
        search: render_search(state),
        overlay,
        confirmation,
        gate: state.gate.as_ref().map(render_gate),
        redirect: state.navigation.map(|navigation| match navigation {
            Navigation::InstructorSurface => INSTRUCTOR_SURFACE_PATH,
            Navigation::Backend => BACKEND_PATH,
        }),
    }
}

/// CSS class for a belt badge; unknown ranks render as white.
pub fn belt_class(belt_rank: &str) -> String {
    let rank = belt_rank.trim().to_ascii_lowercase();
    let color = rank.strip_suffix("_belt").unwrap_or(&rank);
    if BELT_COLORS.contains(&color) {
        format!("belt-{color}")
    } else {
        format!("belt-{DEFAULT_BELT}")
    }
}

fn dots(digits: &str) -> Vec<bool> {
    let filled = digits.chars().count();
    (0..PIN_LENGTH).map(|i| i < filled).collect()
}

fn member_view(member: &ResolvedMember) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name.clone(),
        belt_rank: member.belt_rank.clone(),
        belt_label: member.belt_label(),
        belt_class: belt_class(&member.belt_rank),
        avatar_url: member.avatar_url.clone(),
    }
}

fn render_search(state: &KioskState) -> SearchView {
    let search = &state.name_search;
    let (status, members, message) = match &search.results {
        SearchResults::Idle => ("idle", Vec::new(), None),
        SearchResults::Loading => ("loading", Vec::new(), None),
        SearchResults::Found(members) => ("found", members.iter().map(member_view).collect(), None),
        SearchResults::Empty => ("empty", Vec::new(), Some(NO_MEMBERS_FOUND)),
    };

    SearchView {
        query: search.query.clone(),
        status,
        members,
        message,
    }
}

fn render_overlay(state: &KioskState, overlay: &ClassOverlay) -> Option<OverlayView> {
    let member = state.current_candidate_member.as_ref()?;
    let selected = state.selected_class_session_id;

    let (status, message, sessions, history) = match &overlay.load {
        OverlayLoad::Loading => ("loading", Some(CLASSES_LOADING), Vec::new(), Vec::new()),
        OverlayLoad::Failed => ("failed", Some(CLASSES_FAILED), Vec::new(), Vec::new()),
        OverlayLoad::Populated(info) => (
            "ready",
            info.sessions.is_empty().then_some(NO_CLASSES),
            info.sessions
                .iter()
                .map(|session| session_view(session, selected))
                .collect(),
            info.history.iter().map(history_view).collect(),
        ),
    };

    Some(OverlayView {
        member: member_view(member),
        status,
        message,
        sessions,
        history,
        selected_session_id: selected,
        checkin_enabled: state.checkin_enabled(),
        checkin_label: checkin_label(state, overlay),
        submitting: overlay.submitting,
    })
}

fn checkin_label(state: &KioskState, overlay: &ClassOverlay) -> String {
    if overlay.submitting {
        return "Checking In…".to_string();
    }

    let selected = match (&overlay.load, state.selected_class_session_id) {
        (OverlayLoad::Populated(info), Some(id)) => info.session(id),
        _ => None,
    };
    match selected {
        Some(session) => format!("Check In to {}", session.name),
        None if state.checkin_enabled() => "Check In".to_string(),
        None => "Select a class".to_string(),
    }
}

fn session_view(session: &ClassSessionCandidate, selected: Option<u64>) -> SessionView {
    let spots = if session.capacity == 0 {
        session.count.to_string()
    } else {
        format!("{}/{}", session.count, session.capacity)
    };

    SessionView {
        id: session.id,
        name: session.name.clone(),
        time: session.time.clone(),
        spots,
        full: session.is_full(),
        restricted: !session.eligible,
        reason: session.reason.clone(),
        selectable: session.is_selectable(),
        selected: selected == Some(session.id),
    }
}

fn history_view(entry: &AttendanceEntry) -> HistoryView {
    HistoryView {
        session_name: entry.session_name.clone(),
        date: entry.date.clone(),
        time: entry.time.clone(),
    }
}

fn render_confirmation(
    outcome: &CheckinOutcome,
    member: Option<&ResolvedMember>,
) -> ConfirmationView {
    // The outcome is already completed from the member snapshot; the member is
    // only a last resort for the avatar.
    let belt_rank = outcome.belt_rank.as_deref().unwrap_or(DEFAULT_BELT);
    let avatar_url = outcome
        .avatar_url
        .clone()
        .or_else(|| member.map(|m| m.avatar_url.clone()))
        .unwrap_or_default();

    ConfirmationView {
        status: outcome.status.as_str(),
        success: outcome.is_success(),
        message: outcome.message(),
        name: outcome.name.clone().unwrap_or_default(),
        belt_label: belt_label(belt_rank),
        belt_class: belt_class(belt_rank),
        avatar_url,
    }
}

fn render_gate(gate: &StaffGate) -> GateView {
    GateView {
        purpose: gate.purpose.as_str(),
        pad: PinPadView {
            dots: dots(&gate.digits),
            verifying: gate.verifying,
            error: gate.error,
            message: gate.error.then_some(GATE_REJECTED),
        },
    }
}
