//! Bookshelf application library
//!
//! Application modules plus the bootstrap shared by the `bookshelf-app` and
//! `bookshelf` binaries.

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;
pub mod utils;

/// Registry holding every application module
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Initialize and start all modules, serve HTTP until a shutdown signal
/// arrives, then stop the modules again.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry();
    anyhow::ensure!(!registry.is_empty(), "no application modules registered");
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_all(&ctx)
        .await
        .context("module startup failed")?;

    let served = bookshelf_http::start_server(&registry, &settings, utils::shutdown_signal()).await;

    registry
        .stop_all()
        .await
        .context("module shutdown failed")?;

    served
}
