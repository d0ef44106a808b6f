//! Normalized email addresses.
//!
//! Email identity in Grist access lists is case-insensitive. Every email
//! entering the engine is normalized once, at the boundary, so that set
//! membership and map keys never compare raw strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// An email address normalized to its canonical form: surrounding
/// whitespace stripped, ASCII-lowercased.
///
/// Construction always normalizes; two `Email` values compare equal iff
/// the addresses are the same identity on the platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Email::normalize(&raw).ok_or_else(|| D::Error::custom("empty email address"))
    }
}

impl Email {
    /// Normalize a raw string into an `Email`.
    ///
    /// Returns `None` if the input is empty after trimming; blank cells
    /// and stray separators resolve to nothing rather than to an empty
    /// identity.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_ascii_lowercase()))
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
