//! Recording mock for the access-control port.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::access_control::{AccessControlClient, GuildJoin},
};

/// Scripted access-control client. Role mutations are recorded (including
/// failed attempts) so tests can assert on call order; handshake calls are
/// not logged.
#[derive(Default)]
pub struct RecordingAccessControl {
    calls: Mutex<Vec<String>>,
    fail_exchange: bool,
    fail_guild_join: bool,
    fail_grants: bool,
    fail_revokes: bool,
    already_member: bool,
}

impl RecordingAccessControl {
    pub const ACCESS_TOKEN: &'static str = "token-1";
    pub const IDENTITY_ID: &'static str = "discord-user-1";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    pub fn failing_guild_join(mut self) -> Self {
        self.fail_guild_join = true;
        self
    }

    pub fn failing_grants(mut self) -> Self {
        self.fail_grants = true;
        self
    }

    pub fn failing_revokes(mut self) -> Self {
        self.fail_revokes = true;
        self
    }

    pub fn already_member(mut self) -> Self {
        self.already_member = true;
        self
    }

    /// Role mutations attempted so far, as `grant:{identity}:{role}` /
    /// `revoke:{identity}:{role}` entries in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessControlClient for RecordingAccessControl {
    async fn exchange_code(&self, _code: &str) -> AppResult<String> {
        if self.fail_exchange {
            return Err(AppError::Auth("code exchange refused".into()));
        }
        Ok(Self::ACCESS_TOKEN.to_string())
    }

    async fn resolve_identity(&self, _access_token: &str) -> AppResult<String> {
        Ok(Self::IDENTITY_ID.to_string())
    }

    async fn add_guild_member(
        &self,
        _identity_id: &str,
        _access_token: &str,
    ) -> AppResult<GuildJoin> {
        if self.fail_guild_join {
            return Err(AppError::RoleMutation("guild join refused".into()));
        }
        if self.already_member {
            Ok(GuildJoin::AlreadyMember)
        } else {
            Ok(GuildJoin::Joined)
        }
    }

    async fn grant_role(&self, identity_id: &str, role_id: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("grant:{identity_id}:{role_id}"));
        if self.fail_grants {
            return Err(AppError::RoleMutation("grant refused".into()));
        }
        Ok(())
    }

    async fn revoke_role(&self, identity_id: &str, role_id: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("revoke:{identity_id}:{role_id}"));
        if self.fail_revokes {
            return Err(AppError::RoleMutation("revoke refused".into()));
        }
        Ok(())
    }
}
