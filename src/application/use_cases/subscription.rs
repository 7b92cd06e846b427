use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{access_control::AccessControlClient, member_store::MemberStore},
        use_cases::role_sync::{RoleIds, RoleSyncStatus, apply_role_plan},
    },
    domain::entities::{member::MemberRecord, standing::SubscriptionStanding},
};

// ============================================================================
// Inbound payload
// ============================================================================

/// Normalized subscription notification. The provider sends several payload
/// shapes for the same event, so each field is resolved through an explicit
/// fallback list rather than a fixed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionNotice {
    pub purchase_email: String,
    pub subscription_id: String,
    /// Raw provider status, uppercased. May be empty.
    pub status: String,
    pub plan: String,
}

/// Fallback paths per field. Nested entries are (object, field) pairs tried
/// in order before the flat aliases.
const EMAIL_PATHS: &[(&str, &str)] = &[("buyer", "email"), ("subscriber", "email")];
const EMAIL_ALIASES: &[&str] = &["buyer_email"];
const SUBSCRIPTION_OBJECTS: &[&str] = &["subscription", "purchase"];
const STATUS_ALIASES: &[&str] = &["status", "purchase_status"];

impl SubscriptionNotice {
    /// Resolve a notice from a raw provider payload. Only the purchase email
    /// is required; everything else degrades to an empty string.
    pub fn from_payload(payload: &JsonValue) -> AppResult<Self> {
        let purchase_email = nested_str(payload, EMAIL_PATHS)
            .or_else(|| flat_str(payload, EMAIL_ALIASES))
            .unwrap_or_default();
        if purchase_email.is_empty() {
            return Err(AppError::Validation(
                "Payload carries no purchase email in any recognized field".into(),
            ));
        }

        let subscription_id = subscription_field(payload, "id")
            .or_else(|| flat_str(payload, &["subscription_id"]))
            .unwrap_or_default();

        let status = subscription_field(payload, "status")
            .or_else(|| flat_str(payload, STATUS_ALIASES))
            .unwrap_or_default()
            .to_uppercase();

        let plan = subscription_field(payload, "plan")
            .or_else(|| plan_name(payload))
            .or_else(|| flat_str(payload, &["plan"]))
            .unwrap_or_default();

        Ok(Self {
            purchase_email,
            subscription_id,
            status,
            plan,
        })
    }
}

fn nested_str(payload: &JsonValue, paths: &[(&str, &str)]) -> Option<String> {
    paths.iter().find_map(|(object, field)| {
        payload
            .get(object)
            .and_then(|o| o.get(field))
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn flat_str(payload: &JsonValue, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        payload
            .get(alias)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// A field out of whichever subscription-shaped object the payload carries.
fn subscription_field(payload: &JsonValue, field: &str) -> Option<String> {
    SUBSCRIPTION_OBJECTS.iter().find_map(|object| {
        payload
            .get(object)
            .and_then(|o| o.get(field))
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Some shapes nest the plan as an object with a name.
fn plan_name(payload: &JsonValue) -> Option<String> {
    SUBSCRIPTION_OBJECTS.iter().find_map(|object| {
        payload
            .get(object)
            .and_then(|o| o.get("plan"))
            .and_then(|p| p.get("name"))
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

// ============================================================================
// Use cases
// ============================================================================

/// Result of processing one notification: the merged record plus what role
/// synchronization did for it.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOutcome {
    pub record: MemberRecord,
    pub role_sync: RoleSyncStatus,
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    store: Arc<dyn MemberStore>,
    access: Arc<dyn AccessControlClient>,
    roles: RoleIds,
}

impl SubscriptionUseCases {
    pub fn new(
        store: Arc<dyn MemberStore>,
        access: Arc<dyn AccessControlClient>,
        roles: RoleIds,
    ) -> Self {
        Self {
            store,
            access,
            roles,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn handle_payload(&self, payload: &JsonValue) -> AppResult<NotificationOutcome> {
        let notice = SubscriptionNotice::from_payload(payload)?;
        self.handle_notification(notice).await
    }

    /// Merge a notification into the member record and re-sync roles.
    ///
    /// The store write always happens before any role call, and a role
    /// failure never rolls it back; the caller sees it in the outcome.
    pub async fn handle_notification(
        &self,
        notice: SubscriptionNotice,
    ) -> AppResult<NotificationOutcome> {
        let standing = SubscriptionStanding::classify(&notice.status);

        let mut record = self
            .store
            .get(&notice.purchase_email)
            .await?
            .unwrap_or_else(|| MemberRecord::empty(notice.purchase_email.clone()));

        // Subscription fields are authoritative from the latest event only.
        // The linked identity is never touched from this path.
        record.subscription_id = notice.subscription_id;
        record.status = notice.status;
        record.plan = notice.plan;
        self.store.upsert(&record).await?;

        let role_sync = if record.has_linked_identity() {
            apply_role_plan(
                self.access.as_ref(),
                &self.roles,
                &record.identity_id,
                standing,
            )
            .await
        } else {
            RoleSyncStatus::NoLinkedIdentity
        };

        Ok(NotificationOutcome { record, role_sync })
    }
}
