use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{auth, handlers, images, middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Image routes require an authenticated caller
    let image_routes = Router::new()
        .route("/image/upload", post(images::upload))
        .route("/image/status/{job_id}", get(images::status))
        .route("/image/history/{user_id}", get(images::history))
        .route("/image/task/{job_id}", get(images::download))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Registration and login are reachable without credentials
    let open_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        .route("/auth/registration", post(auth::register))
        .route("/auth/login", post(auth::login));

    Router::new()
        .merge(open_routes)
        .merge(image_routes)
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
