use serde::{Deserialize, Serialize};

use crate::domain::entities::standing::SubscriptionStanding;

/// The reconciled record for one purchase email. Both event sources merge
/// into this; neither ever replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// Natural key. Stored and matched exactly as received.
    pub purchase_email: String,
    /// Last known provider subscription id; empty until a webhook arrives.
    #[serde(default)]
    pub subscription_id: String,
    /// Raw provider status, uppercased. Classification is derived on read.
    #[serde(default)]
    pub status: String,
    /// Informational only, never consulted by role logic.
    #[serde(default)]
    pub plan: String,
    /// Discord principal id; empty until the identity link completes.
    #[serde(default)]
    pub identity_id: String,
}

impl MemberRecord {
    /// An empty record for a purchase email no event has referenced yet.
    pub fn empty(purchase_email: impl Into<String>) -> Self {
        Self {
            purchase_email: purchase_email.into(),
            subscription_id: String::new(),
            status: String::new(),
            plan: String::new(),
            identity_id: String::new(),
        }
    }

    pub fn standing(&self) -> SubscriptionStanding {
        SubscriptionStanding::classify(&self.status)
    }

    pub fn has_linked_identity(&self) -> bool {
        !self.identity_id.is_empty()
    }
}
