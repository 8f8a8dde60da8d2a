use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use recruitflow_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool)?;

    // The webhook and cron paths authenticate themselves; everything
    // else requires a bearer token.
    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/webhook/sms", post(routes::webhook::handle_inbound_sms))
        .route(
            "/api/cron/followups",
            get(routes::cron::run_followups).post(routes::cron::run_followups),
        );

    let authed_api = Router::new()
        .route(
            "/api/recruits",
            get(routes::recruits::list_recruits).post(routes::recruits::create_recruit),
        )
        .route("/api/recruits/export", get(routes::recruits::export_recruits))
        .route(
            "/api/recruits/:id",
            get(routes::recruits::get_recruit).delete(routes::recruits::delete_recruit),
        )
        .route("/api/recruits/:id/notes", patch(routes::recruits::update_notes))
        .route("/api/recruits/:id/stage", post(routes::recruits::change_stage))
        .route("/api/messages", post(routes::messages::send_message))
        .route("/api/messages/unread", get(routes::messages::get_unread))
        .route("/api/messages/:recruit_id", get(routes::messages::get_thread))
        .route(
            "/api/stages",
            get(routes::stages::list_stages).post(routes::stages::create_stage),
        )
        .route(
            "/api/stages/:id",
            patch(routes::stages::update_stage).delete(routes::stages::delete_stage),
        )
        .route(
            "/api/stages/:id/sequences",
            get(routes::stages::list_sequences).post(routes::stages::create_sequence),
        )
        .route("/api/sequences/:id", delete(routes::stages::delete_sequence))
        .route(
            "/api/templates",
            get(routes::templates::list_templates).post(routes::templates::create_template),
        )
        .route(
            "/api/templates/:id",
            patch(routes::templates::update_template)
                .delete(routes::templates::delete_template),
        )
        .layer(axum::middleware::from_fn(
            recruitflow_backend::middleware::auth::require_bearer_auth,
        ));

    let app = public_api
        .merge(authed_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
