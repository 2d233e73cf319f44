use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budget_buddy_backend::{
    config::Config,
    db::connection::{create_pool, run_migrations, DbPool},
    middleware::rate_limit::create_ip_rate_limiter,
    repositories::{PgExpenseRepository, PgUserRepository},
    routes::build_router,
    services::{AuthService, ExpenseService},
    state::AppState,
    utils::{jwt::TokenSettings, password::SecretHasher},
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

/// Hides the password part of a connection URL.
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budget_buddy_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        production_mode = config.production_mode,
        database_url = %mask_database_url(&config.database_url),
        jwt_access_secret = %mask_secret(&config.jwt_access_secret),
        jwt_refresh_secret = %mask_secret(&config.jwt_refresh_secret),
        jwt_access_ttl = config.jwt_access_ttl,
        jwt_refresh_ttl = config.jwt_refresh_ttl,
        rate_limit_per_minute = config.rate_limit_per_minute,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool: DbPool = create_pool(&config.database_url, config.database_connect_timeout()).await?;
    run_migrations(&pool).await?;

    let auth = AuthService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        SecretHasher::from_config(&config)?,
        TokenSettings::from(&config),
    );
    let expenses = ExpenseService::new(Arc::new(PgExpenseRepository::new(pool)));

    let rate_limiter = create_ip_rate_limiter(&config)?;
    let addr = config.bind_addr;
    let app = build_router(AppState::new(config, auth, expenses)).layer(rate_limiter);

    // Start server
    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
