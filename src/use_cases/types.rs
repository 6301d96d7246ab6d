// Use-case level inputs/outputs for the kiosk controller.

use crate::domain::{BackendError, CheckinOutcome, InputMode, MemberInfo, ResolvedMember};

/// A raw keystroke as reported by the scanner bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Modifier,
    Other,
}

impl Key {
    /// Classifies a DOM-style key name (`"a"`, `"Enter"`, `"Shift"`).
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Key::Char(c),
            _ => match name {
                "Enter" => Key::Enter,
                "Shift" | "Control" | "Alt" | "Meta" => Key::Modifier,
                _ => Key::Other,
            },
        }
    }
}

/// Keys of the on-screen number pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKey {
    Digit(u8),
    Back,
}

/// Events produced by people standing at the kiosk.
#[derive(Debug, Clone, PartialEq)]
pub enum KioskInput {
    Key(Key),
    SetMode(InputMode),
    PinKey(PinKey),
    NameInput(String),
    ClearName,
    MemberTap(ResolvedMember),
    SelectClass(u64),
    ConfirmCheckin,
    NotMe,
    DismissConfirmation,
    SelectSession(Option<u64>),
    OpenInstructorGate,
    OpenExitGate,
    GateKey(PinKey),
    CloseGate,
}

/// Remote calls the controller asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lookup {
        mode: InputMode,
        value: String,
    },
    Search {
        query: String,
        session_id: Option<u64>,
    },
    FetchMemberInfo {
        partner_id: u64,
    },
    Checkin {
        partner_id: u64,
        session_id: Option<u64>,
    },
    InstructorAuth {
        attempt: u64,
        pin: String,
    },
}

/// Results of remote calls, fed back into the controller.
#[derive(Debug, Clone)]
pub enum Completion {
    Lookup {
        mode: InputMode,
        value: String,
        result: Result<Option<ResolvedMember>, BackendError>,
    },
    Search {
        query: String,
        result: Result<Vec<ResolvedMember>, BackendError>,
    },
    MemberInfo {
        partner_id: u64,
        result: Result<MemberInfo, BackendError>,
    },
    Checkin {
        partner_id: u64,
        result: Result<CheckinOutcome, BackendError>,
    },
    InstructorAuth {
        attempt: u64,
        result: Result<bool, BackendError>,
    },
}
