use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::{
    AttendanceEntry, BackendError, CheckinOutcome, CheckinStatus, ClassSessionCandidate,
    InputMode, KioskBackend, MemberInfo, ResolvedMember,
};
use crate::use_cases::KioskController;
use crate::use_cases::timers::KioskTimings;
use crate::use_cases::types::{Command, Completion, KioskInput, Key, PinKey};

pub(crate) fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub(crate) fn controller(mode: InputMode) -> KioskController {
    KioskController::new(mode, None, KioskTimings::default())
}

pub(crate) fn member(id: u64) -> ResolvedMember {
    ResolvedMember::new(id, format!("Member {id}"), Some("blue_belt".to_string()), None)
}

pub(crate) fn session(id: u64) -> ClassSessionCandidate {
    ClassSessionCandidate {
        id,
        name: format!("Class {id}"),
        time: "06:00 PM".to_string(),
        capacity: 20,
        count: 4,
        eligible: true,
        reason: None,
    }
}

pub(crate) fn session_full(id: u64) -> ClassSessionCandidate {
    ClassSessionCandidate {
        count: 20,
        ..session(id)
    }
}

pub(crate) fn session_restricted(id: u64) -> ClassSessionCandidate {
    ClassSessionCandidate {
        eligible: false,
        reason: Some("Requires green belt".to_string()),
        ..session(id)
    }
}

pub(crate) fn history(session_name: &str) -> AttendanceEntry {
    AttendanceEntry {
        session_name: session_name.to_string(),
        date: "2026-10-01".to_string(),
        time: Some("05:30 PM".to_string()),
    }
}

pub(crate) fn outcome(status: CheckinStatus) -> CheckinOutcome {
    CheckinOutcome {
        status,
        required_belt: None,
        name: None,
        belt_rank: None,
        avatar_url: None,
    }
}

// Feeds a scanner burst; `\n` stands for Enter.
pub(crate) fn type_barcode(kiosk: &mut KioskController, text: &str, now: Instant) -> Vec<Command> {
    let mut commands = Vec::new();
    for c in text.chars() {
        let key = if c == '\n' { Key::Enter } else { Key::Char(c) };
        commands.extend(kiosk.handle_input(KioskInput::Key(key), now));
    }
    commands
}

pub(crate) fn type_pin(kiosk: &mut KioskController, digits: &str, now: Instant) {
    for c in digits.chars() {
        let digit = c.to_digit(10).expect("test pins are numeric") as u8;
        kiosk.handle_input(KioskInput::PinKey(PinKey::Digit(digit)), now);
    }
}

// Resolves member `id` as if a barcode lookup had found it.
pub(crate) fn identify(kiosk: &mut KioskController, id: u64, now: Instant) -> Vec<Command> {
    kiosk.handle_completion(
        Completion::Lookup {
            mode: InputMode::Barcode,
            value: format!("CARD-{id}"),
            result: Ok(Some(member(id))),
        },
        now,
    )
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub lookup: bool,
    pub search: bool,
    pub member_info: bool,
    pub checkin: bool,
    pub instructor_auth: bool,
}

// Scripted ERP fake. Records every call so tests can assert on the wire
// traffic the runtime produced.
#[derive(Clone, Default)]
pub(crate) struct RecordingBackend {
    members_by_value: Arc<Mutex<Vec<(String, ResolvedMember)>>>,
    member_info: Arc<Mutex<Option<MemberInfo>>>,
    checkin_outcomes: Arc<Mutex<VecDeque<CheckinOutcome>>>,
    instructor_pin: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<Command>>>,
    failures: FailureFlags,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn with_member(self, value: &str, member: ResolvedMember) -> Self {
        self.members_by_value
            .lock()
            .expect("members mutex poisoned")
            .push((value.to_string(), member));
        self
    }

    pub(crate) fn with_member_info(self, info: MemberInfo) -> Self {
        *self.member_info.lock().expect("info mutex poisoned") = Some(info);
        self
    }

    pub(crate) fn with_checkin_outcome(self, outcome: CheckinOutcome) -> Self {
        self.checkin_outcomes
            .lock()
            .expect("outcomes mutex poisoned")
            .push_back(outcome);
        self
    }

    pub(crate) fn with_instructor_pin(self, pin: &str) -> Self {
        *self.instructor_pin.lock().expect("pin mutex poisoned") = Some(pin.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Command> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, command: Command) {
        self.calls.lock().expect("calls mutex poisoned").push(command);
    }
}

#[async_trait]
impl KioskBackend for RecordingBackend {
    async fn lookup(
        &self,
        mode: InputMode,
        value: &str,
    ) -> Result<Option<ResolvedMember>, BackendError> {
        self.record(Command::Lookup {
            mode,
            value: value.to_string(),
        });
        if self.failures.lookup {
            return Err(BackendError::Transport("lookup failed".to_string()));
        }

        let members = self.members_by_value.lock().expect("members mutex poisoned");
        Ok(members
            .iter()
            .find(|(known, _)| known == value)
            .map(|(_, member)| member.clone()))
    }

    async fn search(
        &self,
        query: &str,
        session_id: Option<u64>,
    ) -> Result<Vec<ResolvedMember>, BackendError> {
        self.record(Command::Search {
            query: query.to_string(),
            session_id,
        });
        if self.failures.search {
            return Err(BackendError::Transport("search failed".to_string()));
        }

        let needle = query.to_lowercase();
        let members = self.members_by_value.lock().expect("members mutex poisoned");
        Ok(members
            .iter()
            .filter(|(_, member)| member.name.to_lowercase().contains(&needle))
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn member_info(&self, partner_id: u64) -> Result<MemberInfo, BackendError> {
        self.record(Command::FetchMemberInfo { partner_id });
        if self.failures.member_info {
            return Err(BackendError::Transport("member info failed".to_string()));
        }

        Ok(self
            .member_info
            .lock()
            .expect("info mutex poisoned")
            .clone()
            .unwrap_or_default())
    }

    async fn checkin(
        &self,
        partner_id: u64,
        session_id: Option<u64>,
    ) -> Result<CheckinOutcome, BackendError> {
        self.record(Command::Checkin {
            partner_id,
            session_id,
        });
        if self.failures.checkin {
            return Err(BackendError::Transport("checkin failed".to_string()));
        }

        Ok(self
            .checkin_outcomes
            .lock()
            .expect("outcomes mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| outcome(CheckinStatus::Ok)))
    }

    async fn instructor_auth(&self, pin: &str) -> Result<bool, BackendError> {
        // The port never sees attempt ids.
        self.record(Command::InstructorAuth {
            attempt: 0,
            pin: pin.to_string(),
        });
        if self.failures.instructor_auth {
            return Err(BackendError::Transport("auth failed".to_string()));
        }

        let expected = self.instructor_pin.lock().expect("pin mutex poisoned");
        Ok(expected.as_deref() == Some(pin))
    }
}
