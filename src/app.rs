/*
 * Responsibility
 * - Config読み込み → 依存生成 (stores / AuthService / AccessPolicy) → Router 組み立て
 * - Middleware の適用 (auth / security headers / CORS / HTTP)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, auth::policy::AccessPolicy};
use crate::repos::Stores;
use crate::services::{auth::build_auth_service, seed};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,person_auth_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting API in {:?} mode on {}", config.app_env, config.addr);

    let stores = build_stores(&config).await?;
    let state = build_state(&config, stores).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn build_stores(config: &Config) -> Result<Stores> {
    let stores = match &config.database_url {
        Some(url) => Stores::postgres(url)
            .await
            .context("failed to connect to postgres")?,
        None => {
            tracing::warn!("DATABASE_URL is not set; using in-memory stores");
            Stores::in_memory()
        }
    };

    tracing::info!(
        users = stores.users.backend_name(),
        persons = stores.persons.backend_name(),
        "stores ready"
    );
    Ok(stores)
}

/// Build process-level services here and inject them into the shared application state.
pub async fn build_state(config: &Config, stores: Stores) -> Result<AppState> {
    let auth = build_auth_service(config, stores.users);

    if config.seed_demo_users {
        let created = seed::seed_demo_users(&auth)
            .await
            .context("failed to seed demo users")?;
        tracing::info!(created, "demo users seeded");
    }

    Ok(AppState::new(
        auth,
        stores.persons,
        Arc::new(AccessPolicy::standard()),
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::apply(api::routes(), state.clone()).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
