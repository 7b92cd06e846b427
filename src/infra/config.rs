use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

/// Backing store for member records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(format!("Unknown store backend: {other}")),
        }
    }
}

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    /// Shared secret the payment provider sends with every webhook.
    pub webhook_token: SecretString,
    pub discord_client_id: String,
    pub discord_client_secret: SecretString,
    pub discord_bot_token: SecretString,
    pub discord_redirect_uri: Url,
    /// Discord REST base. Overridable so tests can point at a stub.
    pub discord_api_base: Url,
    pub guild_id: String,
    /// Platform role ids for the two capabilities. Opaque tokens; an empty
    /// id disables that mutation.
    pub role_primary_id: String,
    pub role_pending_id: String,
    /// Admission gate: require a known active subscription before starting
    /// the link handshake.
    pub require_active_subscription: bool,
    /// Whether the gate permits when the member store is unreachable.
    pub gate_fail_open: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let store_backend: StoreBackend = get_env_default("MEMBER_STORE", String::from("memory"))
            .parse()
            .expect("MEMBER_STORE must be 'memory' or 'redis'");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());

        let webhook_token = SecretString::new(get_env::<String>("HOTMART_HOTTOK").into());

        let discord_client_id: String = get_env("DISCORD_CLIENT_ID");
        let discord_client_secret =
            SecretString::new(get_env::<String>("DISCORD_CLIENT_SECRET").into());
        let discord_bot_token = SecretString::new(get_env::<String>("DISCORD_BOT_TOKEN").into());
        let discord_redirect_uri: Url = get_env("DISCORD_REDIRECT_URI");
        let discord_api_base: Url =
            get_env_default("DISCORD_API_BASE", "https://discord.com/api".parse().unwrap());
        let guild_id: String = get_env("DISCORD_GUILD_ID");

        let role_primary_id: String = get_env_default("ROLE_PRIMARY_ID", String::new());
        let role_pending_id: String = get_env_default("ROLE_PENDING_ID", String::new());

        let require_active_subscription: bool =
            get_env_default("REQUIRE_ACTIVE_SUBSCRIPTION", false);
        let gate_fail_open: bool = get_env_default("GATE_FAIL_OPEN", true);

        Self {
            bind_addr,
            cors_origin,
            store_backend,
            redis_url,
            webhook_token,
            discord_client_id,
            discord_client_secret,
            discord_bot_token,
            discord_redirect_uri,
            discord_api_base,
            guild_id,
            role_primary_id,
            role_pending_id,
            require_active_subscription,
            gate_fail_open,
        }
    }
}
