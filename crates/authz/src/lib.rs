//! Token issuance and bearer guards for the bookstore service.

use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use bookstore_kernel::{
    settings::{AuthSettings, Environment},
    InitCtx, Module,
};

pub mod error;
pub mod guard;
pub mod token;

pub use error::AuthError;
pub use guard::BearerGuard;
pub use token::{Claims, TokenIssuer};

/// Core module owning the process-wide token issuer
pub struct AuthzModule {
    issuer: Arc<TokenIssuer>,
}

impl AuthzModule {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let auth = &ctx.settings.auth;

        if ctx.settings.environment == Environment::Production
            && auth.jwt_secret == AuthSettings::default().jwt_secret
        {
            bail!("refusing to run in production with the built-in signing secret");
        }

        if !auth.require_token {
            tracing::warn!(
                module = self.name(),
                "review routes accept requests without a bearer token"
            );
        }

        tracing::info!(
            module = self.name(),
            token_ttl_secs = self.issuer.ttl_secs(),
            require_token = auth.require_token,
            "authz module initialized"
        );
        Ok(())
    }
}

/// Create the authz core module
pub fn create_module(issuer: Arc<TokenIssuer>) -> Arc<dyn Module> {
    Arc::new(AuthzModule::new(issuer))
}
