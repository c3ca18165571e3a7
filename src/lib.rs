//! Documentation of the design-house submission service.
//!
//! Accepts design-details submissions over HTTP, persists each one durably
//! under a fresh id, and thanks the submitter by email once the write has
//! committed.
//!
//!
//!
//! # General Infrastructure
//! - Client posts `{ name, email }` to `/design-details`
//! - Handler validates, writes the record to Redis under `TABLE_NAME:id`
//! - Every committed write emits an insert event on the change feed
//! - A background consumer drains the feed and calls the email provider
//! - Failed sends are retried 3 times per event, then dropped with a log line
//!
//! Ingress throttling and token verification live in front of this process
//! (reverse proxy / gateway); the `verified` access mode only changes which
//! CORS headers are allowed and whether the verified-subject header is lifted
//! into the request. The handlers are identical across both modes.
//!
//!
//!
//! # Notes
//!
//! ## At-least-once, no dedup
//! The feed may hand the consumer the same event twice; the notifier does not
//! deduplicate, so a duplicate event means a duplicate email. With a retry
//! window of 3 attempts per event this is a tolerated cost, not a bug to fix
//! here.
//!
//! ## Silent drop after retries
//! An event that still fails after 3 attempts is gone apart from an
//! error-level log line. There is no dead-letter store or operator alert.
use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::post,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal, spawn};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod access;
pub mod config;
pub mod consumer;
pub mod email;
pub mod error;
pub mod feed;
pub mod record;
pub mod routes;
pub mod state;
pub mod store;

use access::AccessMode;
use config::Config;
use consumer::{ConsumerSettings, run_consumer};
use email::HttpEmailNotifier;
use routes::{design_details_handler, write_handler};
use state::AppState;
use store::{RedisStore, init_redis};

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load();

    info!("Connecting to record store...");
    let connection = init_redis(&config.redis_url).await;

    let (feed_writer, feed_events) = feed::channel();
    let notifier = HttpEmailNotifier::new(&config);
    spawn(run_consumer(feed_events, notifier, ConsumerSettings::default()));

    let store = RedisStore::new(connection, config.table_name.clone(), feed_writer);
    let state = AppState::new(config, store);

    info!("Starting server...");

    let mut app = Router::new()
        .route("/design-details", post(design_details_handler::<RedisStore>))
        .route("/writeToDynamo", post(write_handler))
        .layer(cors_layer(state.config.access_mode))
        .with_state(state.clone());

    if state.config.access_mode == AccessMode::Verified {
        app = app.layer(middleware::from_fn(access::attach_identity));
    }

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

fn cors_layer(mode: AccessMode) -> CorsLayer {
    let headers = match mode {
        AccessMode::Open => vec![CONTENT_TYPE],
        AccessMode::Verified => vec![CONTENT_TYPE, AUTHORIZATION],
    };

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(headers)
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
