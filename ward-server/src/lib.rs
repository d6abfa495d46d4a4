//! WardCare Server - HTTP API over the ward coordinator
//!
//! Every endpoint answers with the coordinator's
//! [`OperationOutcome`](error_common::OperationOutcome) envelope. Failures
//! keep the same body and pick the status code from the error kind, see
//! [`error::status_for`].

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::*;
pub use server::WardServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
pub fn create_app(server: WardServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(server)
}
