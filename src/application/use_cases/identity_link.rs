use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            access_control::{AccessControlClient, GuildJoin},
            member_store::MemberStore,
        },
        use_cases::role_sync::{RoleIds, RoleSyncStatus, apply_role_plan},
    },
    domain::entities::member::MemberRecord,
};

/// Result of completing an identity link: the merged record plus what role
/// synchronization did with the stored subscription status.
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub record: MemberRecord,
    pub role_sync: RoleSyncStatus,
}

/// Admission decision for starting the link handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Permit,
    /// No known active subscription for the purchase email.
    Deny,
}

/// Admission gate configuration. With `require_active_subscription` off the
/// gate always permits, matching the shipped behavior of the original flow.
#[derive(Debug, Clone, Copy)]
pub struct GatePolicy {
    pub require_active_subscription: bool,
    /// Permit when the store is unreachable instead of blocking the
    /// handshake on a backend outage.
    pub fail_open: bool,
}

#[derive(Clone)]
pub struct IdentityLinkUseCases {
    store: Arc<dyn MemberStore>,
    access: Arc<dyn AccessControlClient>,
    roles: RoleIds,
    gate: GatePolicy,
}

impl IdentityLinkUseCases {
    pub fn new(
        store: Arc<dyn MemberStore>,
        access: Arc<dyn AccessControlClient>,
        roles: RoleIds,
        gate: GatePolicy,
    ) -> Self {
        Self {
            store,
            access,
            roles,
            gate,
        }
    }

    /// Pre-handshake admission check on the purchase email.
    pub async fn authorize_start(&self, purchase_email: &str) -> AppResult<GateDecision> {
        if !self.gate.require_active_subscription {
            return Ok(GateDecision::Permit);
        }
        match self.store.get(purchase_email).await {
            Ok(Some(record)) if record.standing().is_active() => Ok(GateDecision::Permit),
            Ok(_) => Ok(GateDecision::Deny),
            Err(err) if self.gate.fail_open => {
                warn!(error = %err, "member store unreachable, admission gate failing open");
                Ok(GateDecision::Permit)
            }
            Err(err) => Err(err),
        }
    }

    /// Complete the identity link for an authorization result.
    ///
    /// The correlator is the purchase email threaded through the OAuth state
    /// parameter. Credential resolution and guild membership run before the
    /// record merge; failures there abort with nothing persisted. Role
    /// re-derivation afterwards is best effort and uses only the status
    /// already on record.
    #[instrument(skip(self, code), fields(correlator = %correlator))]
    pub async fn complete_link(&self, code: &str, correlator: &str) -> AppResult<LinkOutcome> {
        if code.is_empty() {
            return Err(AppError::Validation("Missing authorization code".into()));
        }
        if correlator.is_empty() {
            return Err(AppError::Validation(
                "Missing purchase email correlator".into(),
            ));
        }

        let access_token = self.access.exchange_code(code).await?;
        let identity_id = self.access.resolve_identity(&access_token).await?;

        match self
            .access
            .add_guild_member(&identity_id, &access_token)
            .await?
        {
            GuildJoin::Joined => {}
            GuildJoin::AlreadyMember => {
                debug!(identity_id, "principal already a guild member");
            }
        }

        let mut record = self
            .store
            .get(correlator)
            .await?
            .unwrap_or_else(|| MemberRecord::empty(correlator));

        // The identity is authoritative from this event only; subscription
        // fields stay whatever the latest webhook wrote.
        record.identity_id = identity_id;
        self.store.upsert(&record).await?;

        let role_sync = apply_role_plan(
            self.access.as_ref(),
            &self.roles,
            &record.identity_id,
            record.standing(),
        )
        .await;

        Ok(LinkOutcome { record, role_sync })
    }
}
