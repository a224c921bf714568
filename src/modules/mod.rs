pub mod books;
pub mod users;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use bookstore_authz::{BearerGuard, TokenIssuer};
use bookstore_kernel::{settings::Settings, ModuleRegistry};

/// Build the shared stores and register every module with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let issuer = Arc::new(
        TokenIssuer::from_settings(&settings.auth).context("invalid token issuer settings")?,
    );
    let catalog = Arc::new(books::Catalog::load(
        settings.catalog.fixture_path.as_deref(),
    )?);
    let user_store = Arc::new(users::UserStore::new());

    registry.register_core(bookstore_authz::create_module(issuer.clone()));

    registry.register_custom(books::create_module(books::BooksState {
        catalog,
        guard: BearerGuard::new(issuer.clone(), settings.auth.require_token),
        deferred_delay: Duration::from_millis(settings.catalog.deferred_delay_ms),
    }));

    registry.register_custom(users::create_module(users::UsersState {
        store: user_store,
        issuer,
    }));

    Ok(())
}
