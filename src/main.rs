//! CrewNotes authentication service entry point.

use crewnotes_auth::{
    audit::AuditLog, config::AuthConfig, handlers, rate_limit::LoginRateLimiter,
    service::AuthService, store::PgUserStore,
};

use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewnotes_auth=info,tower_http=info".into()),
        )
        .init();

    let config = AuthConfig::from_env();
    config.validate().expect("Invalid configuration");

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL environment variable must be set");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to the credential store");

    let store = PgUserStore::new(pool);
    store
        .run_migrations()
        .await
        .expect("Failed to run credential store migrations");

    let state = handlers::AppState {
        limiter: Arc::new(LoginRateLimiter::from_config(&config)),
        audit: Arc::new(AuditLog::new(config.audit_log_dir.clone())),
        auth: Arc::new(
            AuthService::new(Arc::new(store), config.clone())
                .expect("Failed to initialize auth service"),
        ),
    };

    let app = handlers::create_routes(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!(addr = %config.bind_addr, "Auth service listening");

    axum::serve(listener, app).await.expect("Server error");
}
