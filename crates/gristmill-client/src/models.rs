//! Wire models for the Grist REST API.
//!
//! Only the fields gristmill consumes are modeled; unknown fields are
//! ignored on deserialization.

use gristmill_core::{ColId, DocId, Role, RowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An organization visible to the API key (`GET /orgs`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Numeric organization id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Subdomain, when the org has one. Either the id or the domain is
    /// accepted wherever an org is addressed.
    #[serde(default)]
    pub domain: Option<String>,
}

/// A workspace and its documents (`GET /orgs/{org}/workspaces`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub docs: Vec<DocInfo>,
}

/// A document entry inside a workspace listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocInfo {
    pub id: DocId,
    pub name: String,
}

/// One user entry from an access listing (`GET /docs/{doc}/access` or
/// `GET /orgs/{org}/access`).
///
/// `access` is the explicit grant on the resource itself; `parent_access`
/// is what the user inherits from the containing workspace/organization.
/// An entry with a null `access` has no explicit grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub parent_access: Option<String>,
}

/// Envelope of an access listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessList {
    #[serde(default)]
    pub users: Vec<AccessUser>,
}

/// One record from a table (`GET /docs/{doc}/tables/{table}/records`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RowId,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// The raw value of a column in this record, if present.
    #[must_use]
    pub fn field(&self, column: &ColId) -> Option<&serde_json::Value> {
        self.fields.get(column.as_str())
    }
}

/// Envelope of a records listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Column metadata (`GET /docs/{doc}/tables/{table}/columns`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: ColId,
    #[serde(default)]
    pub fields: ColumnFields,
}

/// The metadata fields of a column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnFields {
    #[serde(default)]
    pub label: Option<String>,
    /// Declared type, e.g. `"Text"`, `"Ref:Users"`, `"RefList:Users"`.
    #[serde(rename = "type", default)]
    pub col_type: Option<String>,
}

/// Envelope of a columns listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsResponse {
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// PATCH body for `/docs/{doc}/access`: a delta of per-email role
/// changes. A null role removes the explicit grant.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDelta {
    pub delta: UserDelta,
}

/// The `users` map inside an access delta.
#[derive(Debug, Clone, Serialize)]
pub struct UserDelta {
    pub users: BTreeMap<String, Option<String>>,
}

impl AccessDelta {
    /// Delta setting (or, with `None`, removing) a single user's role.
    #[must_use]
    pub fn single(email: &str, role: Option<Role>) -> Self {
        let mut users = BTreeMap::new();
        users.insert(
            email.trim().to_string(),
            role.map(|r| r.as_wire_str().to_string()),
        );
        Self {
            delta: UserDelta { users },
        }
    }
}
