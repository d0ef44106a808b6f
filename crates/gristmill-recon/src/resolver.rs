//! Reference resolution: raw cell values → normalized emails.
//!
//! A configured email column either holds literal email text (single
//! address, comma-separated list, or a list value) or foreign-row
//! identifiers into another table. Reference columns resolve through a
//! [`ReferenceLookup`] built once per bound column per run; lookups are
//! never cached across runs, a stale mapping would silently corrupt the
//! classification.

use crate::error::{ReconError, ReconResult};
use crate::source::DocumentSource;
use gristmill_core::{ColId, DocId, Email, TableId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Leading marker Grist prepends to list-encoded cell values, e.g.
/// `["L", 3, 7]` for a reference list. Stripped before iteration.
const LIST_SENTINEL: &str = "L";

/// Where a reference column's foreign-row ids point: a table and the
/// column within it that holds literal email strings.
///
/// One hop only; the target column must not itself be a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceBinding {
    pub table: TableId,
    pub column: ColId,
}

impl ReferenceBinding {
    /// Derive a binding from a column's declared type tag.
    ///
    /// `Ref:<Table>` and `RefList:<Table>` self-identify the target
    /// table; the email column within it comes from configuration.
    #[must_use]
    pub fn from_declared_type(declared: &str, target_column: &ColId) -> Option<Self> {
        let table = declared
            .strip_prefix("Ref:")
            .or_else(|| declared.strip_prefix("RefList:"))?;
        if table.is_empty() {
            return None;
        }
        Some(Self {
            table: TableId::new(table),
            column: target_column.clone(),
        })
    }
}

/// Configuration of one email-bearing column in the reference table.
///
/// An explicitly supplied `binding` always wins over auto-detection from
/// the column's declared type; schema variants sometimes declare a
/// generic type even though the column stores row ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailColumnConfig {
    pub column: ColId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ReferenceBinding>,
}

impl EmailColumnConfig {
    /// A column holding literal email text (or auto-detected later from
    /// its declared type).
    #[must_use]
    pub fn literal(column: impl Into<ColId>) -> Self {
        Self {
            column: column.into(),
            binding: None,
        }
    }

    /// A column with a manually supplied reference binding.
    #[must_use]
    pub fn bound(column: impl Into<ColId>, table: impl Into<TableId>, target: impl Into<ColId>) -> Self {
        Self {
            column: column.into(),
            binding: Some(ReferenceBinding {
                table: table.into(),
                column: target.into(),
            }),
        }
    }
}

/// Foreign-row-id → normalized-email map for one bound column.
///
/// Built from a snapshot of the target table; read-only for the run.
#[derive(Debug, Clone)]
pub struct ReferenceLookup {
    binding: ReferenceBinding,
    by_row: HashMap<i64, Email>,
}

impl ReferenceLookup {
    /// Fetch the bound target table and build the lookup.
    ///
    /// A failed fetch (for example permission denied on the target
    /// table) aborts with [`ReconError::Resolution`] naming the table;
    /// silently resolving every cell to nothing would produce a false
    /// "fully orphaned" classification.
    pub async fn fetch(
        source: &dyn DocumentSource,
        doc: &DocId,
        binding: ReferenceBinding,
    ) -> ReconResult<Self> {
        let rows = source
            .list_reference_rows(doc, &binding.table)
            .await
            .map_err(|e| ReconError::Resolution {
                table: binding.table.clone(),
                message: e.to_string(),
            })?;

        let mut by_row = HashMap::with_capacity(rows.len());
        for row in &rows {
            let Some(Value::String(raw)) = row.field(&binding.column) else {
                continue;
            };
            if let Some(email) = Email::normalize(raw) {
                by_row.insert(row.id.value(), email);
            }
        }
        Ok(Self { binding, by_row })
    }

    /// Build a lookup from an already-materialized mapping (tests,
    /// pre-fetched snapshots).
    #[must_use]
    pub fn from_map(binding: ReferenceBinding, by_row: HashMap<i64, Email>) -> Self {
        Self { binding, by_row }
    }

    /// The binding this lookup was built for.
    #[must_use]
    pub fn binding(&self) -> &ReferenceBinding {
        &self.binding
    }

    /// Resolve one foreign-row id. Absent ids resolve to nothing; a
    /// dangling reference is a data-integrity gap, not an error.
    #[must_use]
    pub fn resolve(&self, row_id: i64) -> Option<&Email> {
        self.by_row.get(&row_id)
    }
}

/// Resolve a raw cell value into a finite set of normalized emails.
///
/// With a lookup (reference column), integer values and lists of
/// integers resolve through it. Without one, string values split on
/// commas and list values are taken as literal email strings. List
/// values have the leading sentinel marker stripped in both modes.
/// Duplicates within one cell collapse, preserving first-seen order.
/// Pure and deterministic for a fixed lookup.
#[must_use]
pub fn resolve_cell(value: &Value, lookup: Option<&ReferenceLookup>) -> Vec<Email> {
    let mut out: Vec<Email> = Vec::new();
    let mut push = |email: Email| {
        if !out.contains(&email) {
            out.push(email);
        }
    };

    match lookup {
        Some(lookup) => match value {
            Value::Number(n) => {
                if let Some(email) = n.as_i64().and_then(|id| lookup.resolve(id)) {
                    push(email.clone());
                }
            }
            Value::Array(items) => {
                for item in strip_sentinel(items) {
                    if let Some(email) = item.as_i64().and_then(|id| lookup.resolve(id)) {
                        push(email.clone());
                    }
                }
            }
            _ => {}
        },
        None => match value {
            Value::String(raw) => {
                for part in raw.split(',') {
                    if let Some(email) = Email::normalize(part) {
                        push(email);
                    }
                }
            }
            Value::Array(items) => {
                for item in strip_sentinel(items) {
                    if let Some(email) = item.as_str().and_then(Email::normalize) {
                        push(email);
                    }
                }
            }
            _ => {}
        },
    }

    out
}

fn strip_sentinel(items: &[Value]) -> &[Value] {
    match items.first() {
        Some(Value::String(s)) if s == LIST_SENTINEL => &items[1..],
        _ => items,
    }
}
