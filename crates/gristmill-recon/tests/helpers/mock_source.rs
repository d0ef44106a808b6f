//! In-memory `DocumentSource` with failure injection.
//!
//! Tables and columns are fixed at construction; the access map is live
//! state that `set_access` mutates, so correction tests can assert the
//! resulting platform state and idempotence.

use async_trait::async_trait;
use gristmill_client::models::{AccessUser, Column, Record};
use gristmill_client::{GristClientError, GristClientResult};
use gristmill_core::{DocId, Email, Role, TableId};
use gristmill_recon::DocumentSource;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockSource {
    records: HashMap<(DocId, TableId), Vec<Record>>,
    columns: HashMap<(DocId, TableId), Vec<Column>>,
    access: Mutex<HashMap<DocId, BTreeMap<Email, Role>>>,
    fail_access_docs: HashSet<DocId>,
    fail_tables: HashSet<TableId>,
    fail_mutations: HashSet<Email>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, doc: &str, table: &str, records: serde_json::Value) -> Self {
        let records: Vec<Record> = serde_json::from_value(records).unwrap();
        self.records
            .insert((DocId::new(doc), TableId::new(table)), records);
        self
    }

    pub fn with_columns(mut self, doc: &str, table: &str, columns: serde_json::Value) -> Self {
        let columns: Vec<Column> = serde_json::from_value(columns).unwrap();
        self.columns
            .insert((DocId::new(doc), TableId::new(table)), columns);
        self
    }

    pub fn with_grant(self, doc: &str, email: &str, role: Role) -> Self {
        self.access
            .lock()
            .unwrap()
            .entry(DocId::new(doc))
            .or_default()
            .insert(Email::normalize(email).unwrap(), role);
        self
    }

    /// Make `access_list` fail for a document.
    pub fn fail_access(mut self, doc: &str) -> Self {
        self.fail_access_docs.insert(DocId::new(doc));
        self
    }

    /// Make record listing fail for a table (any document).
    pub fn fail_table(mut self, table: &str) -> Self {
        self.fail_tables.insert(TableId::new(table));
        self
    }

    /// Make `set_access` fail for an email (any document).
    pub fn fail_mutation(mut self, email: &str) -> Self {
        self.fail_mutations.insert(Email::normalize(email).unwrap());
        self
    }

    /// Current explicit role of an email on a document.
    pub fn explicit_role(&self, doc: &str, email: &str) -> Option<Role> {
        self.access
            .lock()
            .unwrap()
            .get(&DocId::new(doc))
            .and_then(|m| m.get(&Email::normalize(email).unwrap()))
            .copied()
    }

    /// All explicit grants of a document, for state-equivalence checks.
    pub fn grants(&self, doc: &str) -> BTreeMap<Email, Role> {
        self.access
            .lock()
            .unwrap()
            .get(&DocId::new(doc))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn list_reference_rows(
        &self,
        doc: &DocId,
        table: &TableId,
    ) -> GristClientResult<Vec<Record>> {
        if self.fail_tables.contains(table) {
            return Err(GristClientError::PermissionDenied(format!(
                "no access to table {table}"
            )));
        }
        Ok(self
            .records
            .get(&(doc.clone(), table.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_columns(&self, doc: &DocId, table: &TableId) -> GristClientResult<Vec<Column>> {
        Ok(self
            .columns
            .get(&(doc.clone(), table.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn access_list(&self, doc: &DocId) -> GristClientResult<Vec<AccessUser>> {
        if self.fail_access_docs.contains(doc) {
            return Err(GristClientError::Api {
                status: 502,
                detail: "upstream unavailable".to_string(),
            });
        }
        let access = self.access.lock().unwrap();
        let users = access
            .get(doc)
            .map(|grants| {
                grants
                    .iter()
                    .map(|(email, role)| AccessUser {
                        id: None,
                        email: Some(email.to_string()),
                        name: None,
                        access: Some(role.as_wire_str().to_string()),
                        parent_access: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(users)
    }

    async fn set_access(
        &self,
        doc: &DocId,
        email: &Email,
        role: Option<Role>,
    ) -> GristClientResult<()> {
        if self.fail_mutations.contains(email) {
            return Err(GristClientError::Api {
                status: 400,
                detail: format!("rejected mutation for {email}"),
            });
        }
        let mut access = self.access.lock().unwrap();
        let doc_access = access.entry(doc.clone()).or_default();
        match role {
            Some(role) => {
                doc_access.insert(email.clone(), role);
            }
            None => {
                // Removing a non-existent grant succeeds (idempotent).
                doc_access.remove(email);
            }
        }
        Ok(())
    }
}
