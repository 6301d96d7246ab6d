// Check-in outcomes and the confirmation messages shown for them.

use crate::domain::member::{ResolvedMember, belt_label};

/// Server-reported result of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinStatus {
    Ok,
    AlreadyIn,
    NoSession,
    BeltRankTooLow,
    NotEnrolled,
    Error,
}

impl CheckinStatus {
    /// Maps the wire `status` / `error` pair onto a status.
    /// A known status wins; otherwise the error code decides.
    pub fn from_wire(status: Option<&str>, error: Option<&str>) -> Self {
        let parsed = |code: &str| match code {
            "ok" => Some(CheckinStatus::Ok),
            "already_in" => Some(CheckinStatus::AlreadyIn),
            "no_session" | "session_unavailable" => Some(CheckinStatus::NoSession),
            "belt_rank_too_low" => Some(CheckinStatus::BeltRankTooLow),
            "not_enrolled" => Some(CheckinStatus::NotEnrolled),
            _ => None,
        };

        status
            .and_then(parsed)
            .or_else(|| error.and_then(parsed))
            .unwrap_or(CheckinStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckinStatus::Ok => "ok",
            CheckinStatus::AlreadyIn => "already_in",
            CheckinStatus::NoSession => "no_session",
            CheckinStatus::BeltRankTooLow => "belt_rank_too_low",
            CheckinStatus::NotEnrolled => "not_enrolled",
            CheckinStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinOutcome {
    pub status: CheckinStatus,
    pub required_belt: Option<String>,
    pub name: Option<String>,
    pub belt_rank: Option<String>,
    pub avatar_url: Option<String>,
}

impl CheckinOutcome {
    /// Pessimistic outcome used when the check-in call never completed.
    pub fn transport_failure(member: &ResolvedMember) -> Self {
        Self {
            status: CheckinStatus::Error,
            required_belt: None,
            name: Some(member.name.clone()),
            belt_rank: Some(member.belt_rank.clone()),
            avatar_url: Some(member.avatar_url.clone()),
        }
    }

    /// Fills fields the server left out from the member snapshot.
    pub fn completed_with(mut self, member: &ResolvedMember) -> Self {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().is_none_or(|v| v.trim().is_empty())
        }

        if blank(&self.name) {
            self.name = Some(member.name.clone());
        }
        if blank(&self.belt_rank) {
            self.belt_rank = Some(member.belt_rank.clone());
        }
        if blank(&self.avatar_url) {
            self.avatar_url = Some(member.avatar_url.clone());
        }
        self
    }

    pub fn message(&self) -> String {
        match self.status {
            CheckinStatus::Ok => "✅ Checked In!".to_string(),
            CheckinStatus::AlreadyIn => "👋 Already Checked In".to_string(),
            CheckinStatus::NoSession => "⚠️ No active session selected".to_string(),
            CheckinStatus::BeltRankTooLow => match self.required_belt.as_deref() {
                Some(belt) if !belt.trim().is_empty() => {
                    format!("🥋 Belt Rank Too Low — Requires {}", belt_label(belt))
                }
                _ => "🥋 Belt Rank Too Low".to_string(),
            },
            CheckinStatus::NotEnrolled => "📋 Not Enrolled in This Class".to_string(),
            CheckinStatus::Error => "⚠️ Something went wrong".to_string(),
        }
    }

    /// Positive outcomes render with the success styling.
    pub fn is_success(&self) -> bool {
        self.status == CheckinStatus::Ok
    }
}
