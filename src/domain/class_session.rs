// Class sessions offered to a member during check-in.

/// Schedulable class instance with capacity/eligibility metadata.
/// Fetched per lookup and never cached across interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSessionCandidate {
    pub id: u64,
    pub name: String,
    pub time: String,
    pub capacity: u32,
    pub count: u32,
    pub eligible: bool,
    pub reason: Option<String>,
}

impl ClassSessionCandidate {
    /// A capacity of zero means the class is not capped.
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.count >= self.capacity
    }

    pub fn is_selectable(&self) -> bool {
        self.eligible && !self.is_full()
    }
}

/// One past attendance, shown read-only in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub session_name: String,
    pub date: String,
    pub time: Option<String>,
}

/// Secondary data loaded once a member is identified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInfo {
    pub sessions: Vec<ClassSessionCandidate>,
    pub history: Vec<AttendanceEntry>,
}

impl MemberInfo {
    /// The single selectable session, when it is the only one offered.
    pub fn auto_selection(&self) -> Option<&ClassSessionCandidate> {
        match self.sessions.as_slice() {
            [only] if only.is_selectable() => Some(only),
            _ => None,
        }
    }

    pub fn session(&self, session_id: u64) -> Option<&ClassSessionCandidate> {
        self.sessions.iter().find(|session| session.id == session_id)
    }
}
