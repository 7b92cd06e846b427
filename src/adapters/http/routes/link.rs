//! Identity-link routes: handshake start and OAuth callback.

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::identity_link::GateDecision,
    infra::config::AppConfig,
};

const OAUTH_SCOPE: &str = "identify guilds.join";

const LINKED_PAGE: &str = "<html><body style=\"font-family: sans-serif; text-align: center; \
     padding: 2rem;\"><h1>Discord connected!</h1><p>Your account has been linked. \
     You can close this window.</p></body></html>";

const NO_SUBSCRIPTION_PAGE: &str = "<html><body style=\"font-family: sans-serif; \
     text-align: center; padding: 2rem;\"><h1>No active subscription</h1><p>We could not \
     find an active subscription for this email address.</p></body></html>";

#[derive(Deserialize)]
struct StartParams {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct CallbackParams {
    #[serde(default)]
    code: String,
    #[serde(default)]
    state: String,
}

/// GET /api/link/start?email=
///
/// Runs the admission gate, then hands the browser to the platform's
/// authorize page with the purchase email threaded through `state`.
async fn start_link(
    State(app_state): State<AppState>,
    Query(params): Query<StartParams>,
) -> AppResult<Response> {
    if params.email.is_empty() {
        return Err(AppError::Validation("Missing email".into()));
    }

    match app_state
        .identity_link_use_cases
        .authorize_start(&params.email)
        .await?
    {
        GateDecision::Deny => {
            Ok((StatusCode::FORBIDDEN, Html(NO_SUBSCRIPTION_PAGE)).into_response())
        }
        GateDecision::Permit => {
            let authorize_url = build_authorize_url(&app_state.config, &params.email);
            Ok((StatusCode::FOUND, [(LOCATION, authorize_url.to_string())]).into_response())
        }
    }
}

/// GET /api/link/callback?code=&state=
///
/// Completes the link. The page stays a generic confirmation; the role-sync
/// outcome is logged for the observability layer rather than shown to the
/// end user.
async fn complete_link(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Html<&'static str>> {
    let outcome = app_state
        .identity_link_use_cases
        .complete_link(&params.code, &params.state)
        .await?;

    info!(
        purchase_email = %outcome.record.purchase_email,
        identity_id = %outcome.record.identity_id,
        role_sync = ?outcome.role_sync,
        "identity link completed"
    );
    Ok(Html(LINKED_PAGE))
}

fn build_authorize_url(config: &AppConfig, purchase_email: &str) -> Url {
    let base = config
        .discord_api_base
        .as_str()
        .trim_end_matches('/')
        .to_string();
    // The base is a validated URL, so appending a fixed path cannot fail.
    let mut authorize_url =
        Url::parse(&format!("{base}/oauth2/authorize")).expect("authorize URL must parse");
    authorize_url
        .query_pairs_mut()
        .append_pair("client_id", &config.discord_client_id)
        .append_pair("redirect_uri", config.discord_redirect_uri.as_str())
        .append_pair("response_type", "code")
        .append_pair("scope", OAUTH_SCOPE)
        .append_pair("state", purchase_email);
    authorize_url
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/start", get(start_link))
        .route("/callback", get(complete_link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::{
        adapters::persistence::memory::InMemoryMemberStore,
        application::{ports::member_store::MemberStore, use_cases::identity_link::GatePolicy},
        domain::entities::member::MemberRecord,
        test_utils::{FlakyMemberStore, RecordingAccessControl, test_app_state},
    };

    const GATE_OFF: GatePolicy = GatePolicy {
        require_active_subscription: false,
        fail_open: true,
    };

    const GATE_ON: GatePolicy = GatePolicy {
        require_active_subscription: true,
        fail_open: true,
    };

    #[tokio::test]
    async fn start_redirects_with_email_as_state() {
        let store = Arc::new(InMemoryMemberStore::new());
        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store, access, GATE_OFF);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server.get("/start").add_query_param("email", "a@x.com").await;

        response.assert_status(StatusCode::FOUND);
        let location = response.header(LOCATION);
        let location = location.to_str().unwrap();
        assert!(location.starts_with("https://discord.com/api/oauth2/authorize"));
        assert!(location.contains("state=a%40x.com"));
        assert!(location.contains("scope=identify+guilds.join"));
    }

    #[tokio::test]
    async fn start_without_email_returns_400() {
        let store = Arc::new(InMemoryMemberStore::new());
        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store, access, GATE_OFF);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server.get("/start").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn start_is_denied_without_active_subscription() {
        let store = Arc::new(InMemoryMemberStore::new());
        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store, access, GATE_ON);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server.get("/start").add_query_param("email", "a@x.com").await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert!(response.text().contains("No active subscription"));
    }

    #[tokio::test]
    async fn start_still_permits_when_store_is_down() {
        let store = Arc::new(FlakyMemberStore::unreachable());
        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store, access, GATE_ON);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server.get("/start").add_query_param("email", "a@x.com").await;

        response.assert_status(StatusCode::FOUND);
    }

    #[tokio::test]
    async fn callback_links_identity_and_renders_confirmation() {
        let store = Arc::new(InMemoryMemberStore::new());
        let mut active = MemberRecord::empty("a@x.com");
        active.status = "APPROVED".to_string();
        store.upsert(&active).await.unwrap();

        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store.clone(), access.clone(), GATE_OFF);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server
            .get("/callback")
            .add_query_param("code", "code-1")
            .add_query_param("state", "a@x.com")
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Discord connected!"));

        let stored = store.get("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.identity_id, RecordingAccessControl::IDENTITY_ID);
        assert_eq!(
            access.calls(),
            vec![
                format!("grant:{}:role_primary", RecordingAccessControl::IDENTITY_ID),
                format!("revoke:{}:role_pending", RecordingAccessControl::IDENTITY_ID),
            ]
        );
    }

    #[tokio::test]
    async fn callback_without_code_returns_400() {
        let store = Arc::new(InMemoryMemberStore::new());
        let access = Arc::new(RecordingAccessControl::new());
        let app_state = test_app_state(store, access, GATE_OFF);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server
            .get("/callback")
            .add_query_param("state", "a@x.com")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn callback_surfaces_failed_code_exchange() {
        let store = Arc::new(InMemoryMemberStore::new());
        let access = Arc::new(RecordingAccessControl::new().failing_exchange());
        let app_state = test_app_state(store, access, GATE_OFF);
        let server = TestServer::new(router().with_state(app_state)).unwrap();

        let response = server
            .get("/callback")
            .add_query_param("code", "code-1")
            .add_query_param("state", "a@x.com")
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
    }
}
