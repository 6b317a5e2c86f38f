//! Closet Shop Service
//!
//! REST API for a virtual finance game: users spend a simulated balance on
//! avatar clothing and shop themes, resell clothing for part of its price,
//! and read their bank book. Administrators manage the catalog.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the `Store` / `UnitOfWork` traits
//! - **Authentication**: Bearer token with SHA-256 hashing
//! - **Format**: JSON requests/responses

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::repositories::SharedStore;

/// Build the HTTP router over a store.
pub fn app(store: SharedStore) -> Router {
    let authenticated_routes = Router::new()
        // Catalog routes; mutations are admin-gated in the service layer
        .route(
            "/api/v1/catalog/{kind}",
            get(handlers::catalog::list_entries).post(handlers::catalog::create_entry),
        )
        .route(
            "/api/v1/catalog/{kind}/{id}",
            get(handlers::catalog::get_entry)
                .patch(handlers::catalog::update_entry)
                .delete(handlers::catalog::delete_entry),
        )
        // Closet routes
        .route(
            "/api/v1/closet",
            post(handlers::closet::purchase).get(handlers::closet::list_owned),
        )
        .route("/api/v1/closet/{id}", delete(handlers::closet::resell))
        // Ledger and profile
        .route("/api/v1/ledger", get(handlers::ledger::list_ledger))
        .route("/api/v1/me", get(handlers::ledger::me))
        .route_layer(axum_middleware::from_fn_with_state(
            store.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
