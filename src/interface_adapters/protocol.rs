// Wire protocol DTOs for the kiosk front end (touch screen + scanner bridge).
// ERP-facing DTOs live with the ERP client.

use crate::domain::{InputMode, ResolvedMember};
use crate::use_cases::state::{KioskState, SearchResults};
use crate::use_cases::{Key, KioskInput, PinKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Messages the kiosk front end sends, over HTTP or the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    // Raw keystroke from the scanner wedge, DOM key name.
    Key { key: String },
    SetMode { mode: String },
    // "0".."9" or "back".
    PinKey { key: String },
    NameInput { query: String },
    ClearName,
    // Tap on a name-search result.
    MemberTap { partner_id: u64 },
    SelectClass { session_id: u64 },
    ConfirmCheckin,
    NotMe,
    DismissConfirmation,
    SelectSession {
        #[serde(default)]
        session_id: Option<u64>,
    },
    OpenInstructorGate,
    OpenExitGate,
    GateKey { key: String },
    CloseInstructorGate,
    CloseExitGate,
}

/// Messages the kiosk pushes over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    View(KioskView),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejected {
    UnknownMode(String),
    BadPinKey(String),
    // The tapped member is not among the current search results.
    UnknownMember(u64),
}

impl fmt::Display for InputRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRejected::UnknownMode(mode) => write!(f, "unknown input mode: {mode}"),
            InputRejected::BadPinKey(key) => write!(f, "invalid pin key: {key}"),
            InputRejected::UnknownMember(id) => write!(f, "member {id} is not in the results"),
        }
    }
}

impl std::error::Error for InputRejected {}

impl ClientMessage {
    /// Converts a wire message into a controller input. Member taps are
    /// resolved against the published search results so the client only ever
    /// names an id.
    pub fn into_input(self, state: &KioskState) -> Result<KioskInput, InputRejected> {
        let input = match self {
            ClientMessage::Key { key } => KioskInput::Key(Key::from_name(&key)),
            ClientMessage::SetMode { mode } => KioskInput::SetMode(
                InputMode::parse(&mode).ok_or(InputRejected::UnknownMode(mode))?,
            ),
            ClientMessage::PinKey { key } => KioskInput::PinKey(parse_pin_key(&key)?),
            ClientMessage::NameInput { query } => KioskInput::NameInput(query),
            ClientMessage::ClearName => KioskInput::ClearName,
            ClientMessage::MemberTap { partner_id } => {
                KioskInput::MemberTap(find_search_result(state, partner_id)?)
            }
            ClientMessage::SelectClass { session_id } => KioskInput::SelectClass(session_id),
            ClientMessage::ConfirmCheckin => KioskInput::ConfirmCheckin,
            ClientMessage::NotMe => KioskInput::NotMe,
            ClientMessage::DismissConfirmation => KioskInput::DismissConfirmation,
            ClientMessage::SelectSession { session_id } => KioskInput::SelectSession(session_id),
            ClientMessage::OpenInstructorGate => KioskInput::OpenInstructorGate,
            ClientMessage::OpenExitGate => KioskInput::OpenExitGate,
            ClientMessage::GateKey { key } => KioskInput::GateKey(parse_pin_key(&key)?),
            ClientMessage::CloseInstructorGate | ClientMessage::CloseExitGate => {
                KioskInput::CloseGate
            }
        };
        Ok(input)
    }
}

fn parse_pin_key(key: &str) -> Result<PinKey, InputRejected> {
    let key = key.trim();
    if key.eq_ignore_ascii_case("back") || key == "Backspace" {
        return Ok(PinKey::Back);
    }
    match key.parse::<u8>() {
        Ok(digit) if digit <= 9 && key.len() == 1 => Ok(PinKey::Digit(digit)),
        _ => Err(InputRejected::BadPinKey(key.to_string())),
    }
}

fn find_search_result(state: &KioskState, partner_id: u64) -> Result<ResolvedMember, InputRejected> {
    match &state.name_search.results {
        SearchResults::Found(members) => members
            .iter()
            .find(|member| member.id == partner_id)
            .cloned()
            .ok_or(InputRejected::UnknownMember(partner_id)),
        _ => Err(InputRejected::UnknownMember(partner_id)),
    }
}

/// Everything the front end needs to draw the kiosk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KioskView {
    pub clock: String,
    pub mode: &'static str,
    pub session_id: Option<u64>,
    pub screen: &'static str,
    pub barcode: BarcodeView,
    pub pin: PinPadView,
    pub search: SearchView,
    pub overlay: Option<OverlayView>,
    pub confirmation: Option<ConfirmationView>,
    pub gate: Option<GateView>,
    // Set once when the front end should leave the kiosk page.
    pub redirect: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeView {
    pub buffered: usize,
    pub error_flash: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinPadView {
    pub dots: Vec<bool>,
    pub verifying: bool,
    pub error: bool,
    pub message: Option<&'static str>,
}

// Staff gate pad; `purpose` is "instructor" or "exit".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateView {
    pub purpose: &'static str,
    #[serde(flatten)]
    pub pad: PinPadView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub status: &'static str,
    pub members: Vec<MemberView>,
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberView {
    pub id: u64,
    pub name: String,
    pub belt_rank: String,
    pub belt_label: String,
    pub belt_class: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub member: MemberView,
    pub status: &'static str,
    pub message: Option<&'static str>,
    pub sessions: Vec<SessionView>,
    pub history: Vec<HistoryView>,
    pub selected_session_id: Option<u64>,
    pub checkin_enabled: bool,
    pub checkin_label: String,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: u64,
    pub name: String,
    pub time: String,
    pub spots: String,
    pub full: bool,
    pub restricted: bool,
    pub reason: Option<String>,
    pub selectable: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub session_name: String,
    pub date: String,
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationView {
    pub status: &'static str,
    pub success: bool,
    pub message: String,
    pub name: String,
    pub belt_label: String,
    pub belt_class: String,
    pub avatar_url: String,
}
