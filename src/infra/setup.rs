use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::{memory::InMemoryMemberStore, redis::RedisMemberStore},
    },
    application::{
        ports::{access_control::AccessControlClient, member_store::MemberStore},
        use_cases::{
            identity_link::{GatePolicy, IdentityLinkUseCases},
            role_sync::RoleIds,
            subscription::SubscriptionUseCases,
        },
    },
    infra::{
        config::{AppConfig, StoreBackend},
        discord::DiscordClient,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = Arc::new(AppConfig::from_env());

    let store: Arc<dyn MemberStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(InMemoryMemberStore::new()),
        StoreBackend::Redis => Arc::new(RedisMemberStore::new(&config.redis_url).await?),
    };

    let access: Arc<dyn AccessControlClient> = Arc::new(DiscordClient::new(config.clone()));

    let roles = RoleIds {
        primary: config.role_primary_id.clone(),
        pending: config.role_pending_id.clone(),
    };
    let gate = GatePolicy {
        require_active_subscription: config.require_active_subscription,
        fail_open: config.gate_fail_open,
    };

    let subscription_use_cases =
        SubscriptionUseCases::new(store.clone(), access.clone(), roles.clone());
    let identity_link_use_cases = IdentityLinkUseCases::new(store, access, roles, gate);

    Ok(AppState {
        config,
        subscription_use_cases: Arc::new(subscription_use_cases),
        identity_link_use_cases: Arc::new(identity_link_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "guildsync=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
