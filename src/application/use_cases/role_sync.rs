use serde::Serialize;
use tracing::warn;

use crate::{
    application::ports::access_control::AccessControlClient,
    domain::entities::standing::SubscriptionStanding,
};

/// Logical capabilities on the platform side. The configured role ids they
/// map to are opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Full access for a subscription in good standing.
    Primary,
    /// Provisional access while the subscription is lapsed or unpaid.
    Pending,
}

/// Target role mutations derived from a subscription standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolePlan {
    pub grant: Option<Capability>,
    pub revoke: Option<Capability>,
}

/// Pure derivation of the target role state. Unknown standings produce an
/// empty plan; an event that cannot be classified never mutates roles.
pub fn derive_role_plan(standing: SubscriptionStanding) -> RolePlan {
    match standing {
        SubscriptionStanding::Active => RolePlan {
            grant: Some(Capability::Primary),
            revoke: Some(Capability::Pending),
        },
        SubscriptionStanding::Inactive => RolePlan {
            grant: Some(Capability::Pending),
            revoke: Some(Capability::Primary),
        },
        SubscriptionStanding::Unknown => RolePlan::default(),
    }
}

/// Configured platform role ids for the two capabilities.
#[derive(Debug, Clone)]
pub struct RoleIds {
    pub primary: String,
    pub pending: String,
}

impl RoleIds {
    fn id_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::Primary => &self.primary,
            Capability::Pending => &self.pending,
        }
    }
}

/// What role synchronization did for an event, reported alongside the merged
/// record so callers can tell "record merged" from "role state synchronized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSyncStatus {
    /// The derived plan was applied in full.
    Applied,
    /// No linked identity on record yet; nothing to mutate.
    NoLinkedIdentity,
    /// Standing classified as unknown; role state left untouched.
    StatusUnknown,
    /// At least one mutation failed. The record merge stands regardless.
    Failed,
}

enum Mutation {
    Grant,
    Revoke,
}

/// Apply the plan for `standing` to `identity_id`, best effort. Grant runs
/// before revoke so the principal is never transiently left with neither
/// role. Each mutation gets a single attempt; failures are logged and folded
/// into the returned status, never propagated.
pub async fn apply_role_plan(
    access: &dyn AccessControlClient,
    roles: &RoleIds,
    identity_id: &str,
    standing: SubscriptionStanding,
) -> RoleSyncStatus {
    let plan = derive_role_plan(standing);
    if plan.grant.is_none() && plan.revoke.is_none() {
        return RoleSyncStatus::StatusUnknown;
    }

    let mut all_applied = true;
    if let Some(capability) = plan.grant {
        all_applied &= mutate(access, roles, identity_id, capability, Mutation::Grant).await;
    }
    if let Some(capability) = plan.revoke {
        all_applied &= mutate(access, roles, identity_id, capability, Mutation::Revoke).await;
    }

    if all_applied {
        RoleSyncStatus::Applied
    } else {
        RoleSyncStatus::Failed
    }
}

async fn mutate(
    access: &dyn AccessControlClient,
    roles: &RoleIds,
    identity_id: &str,
    capability: Capability,
    mutation: Mutation,
) -> bool {
    let role_id = roles.id_for(capability);
    if role_id.is_empty() {
        // Unconfigured capability, same as the provider sending no role id.
        return true;
    }
    let result = match mutation {
        Mutation::Grant => access.grant_role(identity_id, role_id).await,
        Mutation::Revoke => access.revoke_role(identity_id, role_id).await,
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(identity_id, role_id, error = %err, "role mutation failed");
            false
        }
    }
}
