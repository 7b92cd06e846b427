//! Failure-injecting member store mock.

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::member_store::MemberStore,
    domain::entities::member::MemberRecord,
};

/// A member store whose backend is down. Every operation fails with a
/// retryable store error.
#[derive(Default)]
pub struct FlakyMemberStore;

impl FlakyMemberStore {
    pub fn unreachable() -> Self {
        Self
    }

    fn down<T>() -> AppResult<T> {
        Err(AppError::Store("member store unreachable".into()))
    }
}

#[async_trait]
impl MemberStore for FlakyMemberStore {
    async fn get(&self, _purchase_email: &str) -> AppResult<Option<MemberRecord>> {
        Self::down()
    }

    async fn upsert(&self, _record: &MemberRecord) -> AppResult<()> {
        Self::down()
    }

    async fn list_all(&self) -> AppResult<Vec<MemberRecord>> {
        Self::down()
    }
}
