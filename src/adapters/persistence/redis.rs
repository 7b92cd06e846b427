use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::member_store::MemberStore,
    domain::entities::member::MemberRecord,
};

/// Redis-backed member store. Records are JSON under `member:{email}`, with
/// single-key get/set as the only atomicity the reconciliation logic relies
/// on.
#[derive(Clone)]
pub struct RedisMemberStore {
    manager: ConnectionManager,
}

impl RedisMemberStore {
    pub async fn new(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            AppError::Store(format!(
                "Redis connection failed (check redis password/URL): {e}"
            ))
        })?;
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            AppError::Store(format!(
                "Redis auth/connection failed (check redis password/URL): {e}"
            ))
        })?;

        Ok(Self { manager })
    }

    fn key(purchase_email: &str) -> String {
        format!("member:{purchase_email}")
    }
}

#[async_trait]
impl MemberStore for RedisMemberStore {
    async fn get(&self, purchase_email: &str) -> AppResult<Option<MemberRecord>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(Self::key(purchase_email))
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        raw.map(|value| {
            serde_json::from_str(&value)
                .map_err(|e| AppError::Store(format!("Corrupt member record: {e}")))
        })
        .transpose()
    }

    async fn upsert(&self, record: &MemberRecord) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let value = serde_json::to_string(record)
            .map_err(|e| AppError::Store(format!("Unencodable member record: {e}")))?;

        let _: () = conn
            .set(Self::key(&record.purchase_email), value)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<MemberRecord>> {
        let mut scan_conn = self.manager.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<'_, String> = scan_conn
                .scan_match("member:*")
                .await
                .map_err(|e| AppError::Store(e.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut conn = self.manager.clone();
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| AppError::Store(e.to_string()))?;
            if let Some(value) = raw {
                let record = serde_json::from_str(&value)
                    .map_err(|e| AppError::Store(format!("Corrupt member record: {e}")))?;
                records.push(record);
            }
        }
        Ok(records)
    }
}
