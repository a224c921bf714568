//! Bookstore Application Library
//!
//! The catalog and user modules of the bookstore service, plus the wiring
//! that runs them on the kernel and HTTP facade.

pub mod modules;
pub mod utils;

use anyhow::Context;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry with every bookstore module registered against `settings`
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings).context("failed to register modules")?;
    Ok(registry)
}

/// Initialize, start, serve until shutdown, and stop all modules
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served =
        bookstore_http::start_server(&registry, &settings, bookstore_http::shutdown_signal())
            .await;

    registry.stop_all().await?;
    served
}
