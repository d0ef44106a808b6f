//! Strongly typed Grist identifiers.
//!
//! The newtype pattern keeps document, table and column identifiers from
//! being interchanged at compile time. Grist identifiers are opaque
//! strings (documents, tables, columns) or integers (rows).
//!
//! # Example
//!
//! ```
//! use gristmill_core::{DocId, TableId};
//!
//! fn requires_doc(id: &DocId) -> &str {
//!     id.as_str()
//! }
//!
//! let doc = DocId::new("8Lx7mPCvQkTz");
//! let table = TableId::new("Companies");
//! requires_doc(&doc);
//! // requires_doc(&table); // does not compile
//! # let _ = table;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Defines a string-backed identifier newtype.
macro_rules! define_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from its raw string form.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

define_string_id!(
    /// Identifier of a Grist document.
    DocId
);

define_string_id!(
    /// Identifier of a table within a document.
    TableId
);

define_string_id!(
    /// Identifier of a column within a table.
    ColId
);

/// Identifier of a row within a table.
///
/// Grist row identifiers are positive integers; reference cells store
/// them as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(i64);

impl RowId {
    /// Creates a row identifier from its integer form.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The underlying integer.
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RowId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}
