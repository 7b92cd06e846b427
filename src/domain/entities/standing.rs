use serde::{Deserialize, Serialize};

/// Classification of a raw provider subscription status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStanding {
    Active,
    Inactive,
    Unknown,
}

/// Statuses the provider reports for a subscription in good standing.
const ACTIVE_STATUSES: &[&str] = &["APPROVED", "PAID", "ACTIVE"];

/// Statuses the provider reports for a lapsed or problematic subscription.
const INACTIVE_STATUSES: &[&str] = &[
    "DELAYED",
    "OVERDUE",
    "PENDING",
    "EXPIRED",
    "CANCELED",
    "CANCELLED",
    "REFUNDED",
    "CHARGEBACK",
    "SUSPENDED",
];

impl SubscriptionStanding {
    /// Classify a raw provider status string. Total: any string the provider
    /// might send (including empty) maps to exactly one standing.
    pub fn classify(raw_status: &str) -> Self {
        let upper = raw_status.to_uppercase();
        if ACTIVE_STATUSES.contains(&upper.as_str()) {
            SubscriptionStanding::Active
        } else if INACTIVE_STATUSES.contains(&upper.as_str()) {
            SubscriptionStanding::Inactive
        } else {
            SubscriptionStanding::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStanding::Active => "active",
            SubscriptionStanding::Inactive => "inactive",
            SubscriptionStanding::Unknown => "unknown",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStanding::Active)
    }
}

impl std::fmt::Display for SubscriptionStanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
