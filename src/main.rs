use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use job_portal_backend::{
    config::{get_config, init_config},
    routes,
    storage::supabase::SupabaseStore,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let store = SupabaseStore::new(config)?;
    let app_state = AppState::new(Arc::new(store));

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/auth/reset-password",
            post(routes::auth::reset_password),
        )
        .route("/api/jobs", get(routes::jobs::list_jobs))
        .route("/api/jobs/:id", get(routes::jobs::get_job));

    let session_api = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .route(
            "/api/auth/change-password",
            post(routes::auth::change_password),
        )
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/jobs", post(routes::jobs::create_job))
        .route("/api/jobs/:id", put(routes::jobs::update_job))
        .route(
            "/api/jobs/:id/applications",
            post(routes::applications::submit_application),
        )
        .route(
            "/api/applications/received",
            get(routes::applications::received_applications),
        )
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route("/api/profile/resume", post(routes::profile::upload_resume))
        .layer(from_fn_with_state(
            app_state.clone(),
            job_portal_backend::middleware::auth::require_session,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(session_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
