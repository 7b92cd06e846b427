//! In-memory mocks and state builders shared by unit and route tests.

mod access_mocks;
mod store_mocks;

pub use access_mocks::RecordingAccessControl;
pub use store_mocks::FlakyMemberStore;

use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::{access_control::AccessControlClient, member_store::MemberStore},
        use_cases::{
            identity_link::{GatePolicy, IdentityLinkUseCases},
            role_sync::RoleIds,
            subscription::SubscriptionUseCases,
        },
    },
    infra::config::{AppConfig, StoreBackend},
};

pub const TEST_WEBHOOK_TOKEN: &str = "test-hottok";

pub fn test_roles() -> RoleIds {
    RoleIds {
        primary: "role_primary".to_string(),
        pending: "role_pending".to_string(),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        store_backend: StoreBackend::Memory,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        webhook_token: SecretString::new(TEST_WEBHOOK_TOKEN.into()),
        discord_client_id: "client-id".to_string(),
        discord_client_secret: SecretString::new("client-secret".into()),
        discord_bot_token: SecretString::new("bot-token".into()),
        discord_redirect_uri: "https://app.test/api/link/callback".parse().unwrap(),
        discord_api_base: "https://discord.com/api".parse().unwrap(),
        guild_id: "guild-1".to_string(),
        role_primary_id: "role_primary".to_string(),
        role_pending_id: "role_pending".to_string(),
        require_active_subscription: false,
        gate_fail_open: true,
    }
}

/// AppState over the given store and access-control mocks, for route tests.
pub fn test_app_state(
    store: Arc<dyn MemberStore>,
    access: Arc<dyn AccessControlClient>,
    gate: GatePolicy,
) -> AppState {
    let config = Arc::new(test_config());
    let roles = RoleIds {
        primary: config.role_primary_id.clone(),
        pending: config.role_pending_id.clone(),
    };
    AppState {
        config,
        subscription_use_cases: Arc::new(SubscriptionUseCases::new(
            store.clone(),
            access.clone(),
            roles.clone(),
        )),
        identity_link_use_cases: Arc::new(IdentityLinkUseCases::new(store, access, roles, gate)),
    }
}
