// Member identity as seen by the kiosk.

use std::fmt;

/// Belt assumed when the ERP does not report one.
pub const DEFAULT_BELT: &str = "white";

/// Which input channel produced a candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    Barcode,
    Pin,
    Name,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Barcode => "barcode",
            InputMode::Pin => "pin",
            InputMode::Name => "name",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "barcode" => Some(InputMode::Barcode),
            "pin" => Some(InputMode::Pin),
            "name" => Some(InputMode::Name),
            _ => None,
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member record returned by the lookup or search collaborator.
/// Trusted for the remainder of one check-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    pub id: u64,
    pub name: String,
    pub belt_rank: String,
    pub avatar_url: String,
}

impl ResolvedMember {
    /// Builds a member, filling the ERP defaults for belt and avatar.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        belt_rank: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            belt_rank: belt_rank
                .filter(|belt| !belt.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BELT.to_string()),
            avatar_url: avatar_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| default_avatar_url(id)),
        }
    }

    pub fn belt_label(&self) -> String {
        belt_label(&self.belt_rank)
    }
}

/// Human readable belt name: `blue_belt` -> `blue belt`.
pub fn belt_label(belt_rank: &str) -> String {
    let belt = if belt_rank.trim().is_empty() {
        DEFAULT_BELT
    } else {
        belt_rank
    };
    belt.replace('_', " ")
}

pub fn default_avatar_url(partner_id: u64) -> String {
    format!("/web/image/res.partner/{partner_id}/avatar_128")
}
