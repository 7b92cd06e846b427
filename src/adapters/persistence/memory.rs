use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    app_error::AppResult,
    application::ports::member_store::MemberStore,
    domain::entities::member::MemberRecord,
};

/// HashMap-backed member store. The default backing for local runs; also the
/// workhorse for tests.
#[derive(Default)]
pub struct InMemoryMemberStore {
    records: RwLock<HashMap<String, MemberRecord>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn get(&self, purchase_email: &str) -> AppResult<Option<MemberRecord>> {
        Ok(self.records.read().await.get(purchase_email).cloned())
    }

    async fn upsert(&self, record: &MemberRecord) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.purchase_email.clone(), record.clone());
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<MemberRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
