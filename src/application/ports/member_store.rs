use async_trait::async_trait;

use crate::{app_error::AppResult, domain::entities::member::MemberRecord};

/// Key-value persistence for member records, keyed by purchase email.
///
/// The store only promises atomic single-key get/put. The reconciliation
/// logic does not rely on anything stronger; concurrent writers for the same
/// key are last-write-wins per field.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn get(&self, purchase_email: &str) -> AppResult<Option<MemberRecord>>;

    async fn upsert(&self, record: &MemberRecord) -> AppResult<()>;

    /// Full scan, used only by validation-style checks, never by the
    /// reconciliation path.
    async fn list_all(&self) -> AppResult<Vec<MemberRecord>>;
}
