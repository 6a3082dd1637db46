//! Readiness handler backed by the task store and cache checks.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Readiness check that pings the task store and the cache backend.
///
/// With the in-process backends both checks always pass.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "store",
            Box::pin(async {
                state
                    .tasks
                    .repository()
                    .ping()
                    .await
                    .map_err(|e| format!("Store ping failed: {}", e))
            }),
        ),
        (
            "cache",
            Box::pin(async {
                state
                    .tasks
                    .cache()
                    .ping()
                    .await
                    .map_err(|e| format!("Cache ping failed: {}", e))
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
