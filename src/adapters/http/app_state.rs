use std::sync::Arc;

use crate::{
    application::use_cases::{
        identity_link::IdentityLinkUseCases, subscription::SubscriptionUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub identity_link_use_cases: Arc<IdentityLinkUseCases>,
}
