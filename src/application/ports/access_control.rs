use async_trait::async_trait;

use crate::app_error::AppResult;

/// Outcome of asking the platform to add a principal to the guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuildJoin {
    Joined,
    /// The principal was already a guild member. Counts as success.
    AlreadyMember,
}

/// Access-control operations against the chat platform.
///
/// Implementations map these to provider-specific APIs. Role identifiers are
/// opaque configured tokens; the port never interprets them.
#[async_trait]
pub trait AccessControlClient: Send + Sync {
    /// Exchange an OAuth authorization code for a user access token.
    async fn exchange_code(&self, code: &str) -> AppResult<String>;

    /// Resolve a user access token to the platform principal id.
    async fn resolve_identity(&self, access_token: &str) -> AppResult<String>;

    /// Add the principal to the guild. Idempotent from the caller's view:
    /// `AlreadyMember` is success, not an error.
    async fn add_guild_member(
        &self,
        identity_id: &str,
        access_token: &str,
    ) -> AppResult<GuildJoin>;

    async fn grant_role(&self, identity_id: &str, role_id: &str) -> AppResult<()>;

    async fn revoke_role(&self, identity_id: &str, role_id: &str) -> AppResult<()>;
}
