//! Loyalty CRM - points ledger and prize redemption service
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for HTTP API with rate limiting
//! - Best-effort HTTP notification dispatch
//! - Tokio for async runtime

mod entity;
mod error;
mod handlers;
mod notify;
mod prelude;
mod state;
mod sv;
#[cfg(test)]
mod test_utils;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::notify::Notifier;
use crate::prelude::*;
use crate::state::AppState;

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "loyalty=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:loyalty.db?mode=rwc".into());
  let notify_endpoint = env::var("NOTIFY_ENDPOINT").ok();

  if notify_endpoint.is_none() {
    warn!("NOTIFY_ENDPOINT not set, notifications disabled");
  }

  info!("Starting Loyalty CRM v{}", env!("CARGO_PKG_VERSION"));

  // Initialize application state
  let app_state =
    Arc::new(AppState::new(&db_url, Notifier::new(notify_endpoint)).await);

  // Configure rate limiting (100 requests per minute per IP)
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();

  // Spawn rate limiter cleanup task
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  // Build router with middleware
  let app = Router::new()
    // Public endpoints
    .route("/health", get(handlers::health))
    .route("/api/register", post(handlers::register))
    .route("/api/links/validate", post(handlers::validate_link))
    .route("/api/prizes", get(handlers::catalog))
    .route("/api/profile", get(handlers::my_profile))
    .route("/api/ledger", get(handlers::my_ledger))
    .route(
      "/api/redemptions",
      get(handlers::my_redemptions).post(handlers::request_redemption),
    )
    // Admin endpoints
    .route("/api/admin/bonus", post(handlers::grant_bonus))
    .route("/api/admin/deduct", post(handlers::deduct_points))
    .route("/api/admin/invite", post(handlers::invite_user))
    .route("/api/admin/users", get(handlers::list_users))
    .route("/api/admin/users/{id}/verified", post(handlers::set_user_verified))
    .route(
      "/api/admin/prizes",
      get(handlers::list_prizes).post(handlers::create_prize),
    )
    .route(
      "/api/admin/prizes/{id}",
      put(handlers::update_prize).delete(handlers::delete_prize),
    )
    .route("/api/admin/prizes/{id}/active", post(handlers::set_prize_active))
    .route("/api/admin/redemptions", get(handlers::pending_redemptions))
    .route(
      "/api/admin/redemptions/{id}/resolve",
      post(handlers::resolve_redemption),
    )
    .route(
      "/api/admin/links",
      get(handlers::list_links).post(handlers::create_link),
    )
    .route("/api/admin/stats", get(handlers::stats))
    // Middleware
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state)
    .into_make_service_with_connect_info::<SocketAddr>();

  // Start HTTP server
  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|p| p.parse().ok())
    .unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener =
    tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(listener, app).await.expect("Server error");
}
