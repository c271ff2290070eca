//! Backend for the browser front end: relays job creation and status queries to the job
//! backend, so the browser never talks to it directly.
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use jobs_api::JobsApi;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod relay;

use relay::AppState;

/// Environment variable holding the address to listen on
pub const BFF_ADDR_VAR: &str = "TIMESHEET_BFF_ADDR";
pub const DEFAULT_BFF_ADDR: &str = "127.0.0.1:4000";

pub fn app(api: JobsApi) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/timesheet/jobs", post(relay::create_job))
        .route("/timesheet/jobs/status", get(relay::job_status))
        .with_state(AppState { api: Arc::new(api) })
        .layer(cors)
}
