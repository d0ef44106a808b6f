//! Document access roles.
//!
//! Grist exposes roles on the wire as plural group names (`"viewers"`,
//! `"editors"`, `"owners"`). Parsing is strict: only the exact wire names
//! are accepted. Free-text labels must never be matched by substring — a
//! display string like `"Co-owner-ish"` must not parse as an owner.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Explicit document-level access role.
///
/// Ordered by privilege: `Viewer < Editor < Owner`. [`Role::Viewer`] is
/// the lowest privilege and the role used for every corrective grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl Role {
    /// The wire form used by the Grist access API.
    #[must_use]
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewers",
            Role::Editor => "editors",
            Role::Owner => "owners",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Error returned when a string is not an exact role wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown access role: {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewers" => Ok(Role::Viewer),
            "editors" => Ok(Role::Editor),
            "owners" => Ok(Role::Owner),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
