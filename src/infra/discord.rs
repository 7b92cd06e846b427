use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::access_control::{AccessControlClient, GuildJoin},
    infra::{config::AppConfig, http_client},
};

/// Discord REST implementation of the access-control port.
///
/// OAuth calls authenticate with the user access token; guild and role
/// mutations use the bot token. 201 and 204 both count as success, matching
/// how the API reports idempotent mutations.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    config: Arc<AppConfig>,
    api_base: String,
}

impl DiscordClient {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let api_base = config
            .discord_api_base
            .as_str()
            .trim_end_matches('/')
            .to_string();
        Self {
            client: http_client::build_client(),
            config,
            api_base,
        }
    }

    fn bot_auth(&self) -> String {
        format!("Bot {}", self.config.discord_bot_token.expose_secret())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    id: String,
}

#[async_trait]
impl AccessControlClient for DiscordClient {
    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response = self
            .client
            .post(format!("{}/oauth2/token", self.api_base))
            .form(&[
                ("client_id", self.config.discord_client_id.as_str()),
                (
                    "client_secret",
                    self.config.discord_client_secret.expose_secret(),
                ),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.discord_redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token exchange request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token exchange rejected ({status}): {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Unreadable token response: {e}")))?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Auth("Token response carries no access token".into()))
    }

    async fn resolve_identity(&self, access_token: &str) -> AppResult<String> {
        let response = self
            .client
            .get(format!("{}/users/@me", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Identity lookup failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Identity lookup rejected ({status}): {body}"
            )));
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Unreadable identity response: {e}")))?;
        Ok(me.id)
    }

    async fn add_guild_member(
        &self,
        identity_id: &str,
        access_token: &str,
    ) -> AppResult<GuildJoin> {
        let response = self
            .client
            .put(format!(
                "{}/guilds/{}/members/{}",
                self.api_base, self.config.guild_id, identity_id
            ))
            .header("Authorization", self.bot_auth())
            .json(&serde_json::json!({ "access_token": access_token }))
            .send()
            .await
            .map_err(|e| AppError::RoleMutation(format!("Guild join request failed: {e}")))?;

        match response.status() {
            StatusCode::CREATED => Ok(GuildJoin::Joined),
            // The API answers 204 when the user is already in the guild.
            StatusCode::NO_CONTENT => Ok(GuildJoin::AlreadyMember),
            status if status.is_success() => Ok(GuildJoin::Joined),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::RoleMutation(format!(
                    "Guild join rejected ({status}): {body}"
                )))
            }
        }
    }

    async fn grant_role(&self, identity_id: &str, role_id: &str) -> AppResult<()> {
        let response = self
            .client
            .put(format!(
                "{}/guilds/{}/members/{}/roles/{}",
                self.api_base, self.config.guild_id, identity_id, role_id
            ))
            .header("Authorization", self.bot_auth())
            .send()
            .await
            .map_err(|e| AppError::RoleMutation(format!("Role grant request failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AppError::RoleMutation(format!(
                "Role grant rejected ({status}): {body}"
            )))
        }
    }

    async fn revoke_role(&self, identity_id: &str, role_id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(format!(
                "{}/guilds/{}/members/{}/roles/{}",
                self.api_base, self.config.guild_id, identity_id, role_id
            ))
            .header("Authorization", self.bot_auth())
            .send()
            .await
            .map_err(|e| AppError::RoleMutation(format!("Role revoke request failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AppError::RoleMutation(format!(
                "Role revoke rejected ({status}): {body}"
            )))
        }
    }
}
