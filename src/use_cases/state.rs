// Kiosk session state: the single in-memory record mutated by input events and
// remote-call completions. Rendering reads a snapshot of it.

use crate::domain::{CheckinOutcome, InputMode, MemberInfo, ResolvedMember};

pub const PIN_LENGTH: usize = 4;
pub const MIN_BARCODE_LENGTH: usize = 2;
// Exit PIN used when none is configured.
pub const DEFAULT_EXIT_PIN: &str = "1234";

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Input,
    ClassSelect(ClassOverlay),
    Confirmation(CheckinOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassOverlay {
    pub load: OverlayLoad,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayLoad {
    Loading,
    Populated(MemberInfo),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchResults {
    Idle,
    Loading,
    Found(Vec<ResolvedMember>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameSearch {
    pub query: String,
    pub results: SearchResults,
}

impl Default for NameSearch {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: SearchResults::Idle,
        }
    }
}

/// Which staff action a gate unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePurpose {
    Instructor,
    Exit,
}

impl GatePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            GatePurpose::Instructor => "instructor",
            GatePurpose::Exit => "exit",
        }
    }

    pub fn destination(self) -> Navigation {
        match self {
            GatePurpose::Instructor => Navigation::InstructorSurface,
            GatePurpose::Exit => Navigation::Backend,
        }
    }
}

/// Staff PIN pad shown over the input screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffGate {
    pub purpose: GatePurpose,
    pub digits: String,
    pub verifying: bool,
    // Set after a rejected PIN until the cooldown clears it.
    pub error: bool,
    // Attempt id of the verification in flight, if any.
    pub attempt: Option<u64>,
}

impl StaffGate {
    pub fn new(purpose: GatePurpose) -> Self {
        Self {
            purpose,
            digits: String::new(),
            verifying: false,
            error: false,
            attempt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    InstructorSurface,
    Backend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KioskState {
    pub active_input_mode: InputMode,
    pub terminal_session_id: Option<u64>,
    pub selected_class_session_id: Option<u64>,
    pub current_candidate_member: Option<ResolvedMember>,
    pub pending_pin_digits: String,
    pub pin_in_flight: bool,
    pub pin_error: bool,
    pub barcode_accumulator: String,
    pub barcode_error_flash: bool,
    pub name_search: NameSearch,
    pub screen: Screen,
    pub gate: Option<StaffGate>,
    pub navigation: Option<Navigation>,
}

impl KioskState {
    pub fn new(mode: InputMode, terminal_session_id: Option<u64>) -> Self {
        Self {
            active_input_mode: mode,
            terminal_session_id: terminal_session_id.filter(|id| *id != 0),
            selected_class_session_id: None,
            current_candidate_member: None,
            pending_pin_digits: String::new(),
            pin_in_flight: false,
            pin_error: false,
            barcode_accumulator: String::new(),
            barcode_error_flash: false,
            name_search: NameSearch::default(),
            screen: Screen::Input,
            gate: None,
            navigation: None,
        }
    }

    pub fn overlay(&self) -> Option<&ClassOverlay> {
        match &self.screen {
            Screen::ClassSelect(overlay) => Some(overlay),
            _ => None,
        }
    }

    pub fn overlay_mut(&mut self) -> Option<&mut ClassOverlay> {
        match &mut self.screen {
            Screen::ClassSelect(overlay) => Some(overlay),
            _ => None,
        }
    }

    pub fn is_on_input_screen(&self) -> bool {
        matches!(self.screen, Screen::Input)
    }

    /// Session a check-in would target: the overlay selection, else the
    /// terminal's configured session.
    pub fn checkin_session_id(&self) -> Option<u64> {
        self.selected_class_session_id.or(self.terminal_session_id)
    }

    /// Whether the overlay's check-in button accepts a tap.
    pub fn checkin_enabled(&self) -> bool {
        let Some(overlay) = self.overlay() else {
            return false;
        };
        if overlay.submitting || self.current_candidate_member.is_none() {
            return false;
        }

        match overlay.load {
            OverlayLoad::Failed => self.checkin_session_id().is_some(),
            OverlayLoad::Populated(_) => self.selected_class_session_id.is_some(),
            OverlayLoad::Loading => false,
        }
    }

    /// Drops everything tied to the member flow and returns to the base mode.
    pub fn clear_member_flow(&mut self) {
        self.current_candidate_member = None;
        self.selected_class_session_id = None;
        self.pending_pin_digits.clear();
        self.pin_in_flight = false;
        self.pin_error = false;
        self.barcode_accumulator.clear();
        self.barcode_error_flash = false;
        self.name_search = NameSearch::default();
        self.screen = Screen::Input;
    }
}
