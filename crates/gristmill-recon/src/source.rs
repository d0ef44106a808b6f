//! Collaborator seam between the engine and the platform.
//!
//! The engine never talks HTTP directly; it sees the document platform
//! through [`DocumentSource`]. The production implementation is
//! [`GristClient`]; tests use an in-memory mock.

use async_trait::async_trait;
use gristmill_client::models::{AccessUser, Column, Record};
use gristmill_client::{GristClient, GristClientResult};
use gristmill_core::{DocId, Email, Role, TableId};

/// Read and mutation operations the engine needs from a document
/// platform.
///
/// `set_access` must be idempotent: setting an identical role twice, or
/// removing a grant that does not exist, succeeds. Implementations must
/// not retry internally; transient failures surface to the caller.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// All records of a reference table, in the table's native order.
    async fn list_reference_rows(
        &self,
        doc: &DocId,
        table: &TableId,
    ) -> GristClientResult<Vec<Record>>;

    /// Column metadata of a table, including declared types.
    async fn list_columns(&self, doc: &DocId, table: &TableId) -> GristClientResult<Vec<Column>>;

    /// The document's access listing, explicit and inherited entries
    /// alike. Filtering to explicit grants is the engine's job.
    async fn access_list(&self, doc: &DocId) -> GristClientResult<Vec<AccessUser>>;

    /// Set (or with `None`, remove) a user's explicit role on a
    /// document.
    async fn set_access(
        &self,
        doc: &DocId,
        email: &Email,
        role: Option<Role>,
    ) -> GristClientResult<()>;
}

#[async_trait]
impl DocumentSource for GristClient {
    async fn list_reference_rows(
        &self,
        doc: &DocId,
        table: &TableId,
    ) -> GristClientResult<Vec<Record>> {
        self.list_records(doc, table).await
    }

    async fn list_columns(&self, doc: &DocId, table: &TableId) -> GristClientResult<Vec<Column>> {
        GristClient::list_columns(self, doc, table).await
    }

    async fn access_list(&self, doc: &DocId) -> GristClientResult<Vec<AccessUser>> {
        Ok(self.doc_access(doc).await?.users)
    }

    async fn set_access(
        &self,
        doc: &DocId,
        email: &Email,
        role: Option<Role>,
    ) -> GristClientResult<()> {
        GristClient::set_access(self, doc, email.as_str(), role).await
    }
}
