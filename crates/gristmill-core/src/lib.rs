//! Core types shared across gristmill crates.
//!
//! Provides the closed [`Role`] enumeration, the normalized [`Email`]
//! newtype that all set arithmetic in the reconciliation engine runs on,
//! and strongly typed identifiers for Grist documents, tables, columns
//! and rows.

pub mod email;
pub mod ids;
pub mod role;

pub use email::Email;
pub use ids::{ColId, DocId, RowId, TableId};
pub use role::{ParseRoleError, Role};
