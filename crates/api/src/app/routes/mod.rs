use axum::{
    routing::{get, post},
    Router,
};

pub mod chat;
pub mod common;
pub mod dashboard;
pub mod exhibitors;
pub mod expos;
pub mod feedback;
pub mod floor_plans;
pub mod system;
pub mod users;

/// Endpoints reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/user/signup", post(users::signup))
        .route("/api/user/login", post(users::login))
        .route("/api/expo", get(expos::list_expos))
        .route("/api/expo/:id", get(expos::get_expo))
        .route("/api/expo/schedule/:id", get(expos::list_schedule))
        .route("/api/expo/:id/floorplan", get(floor_plans::get_floor_plan))
        .route("/api/expo/:id/floorplan/stats", get(floor_plans::floor_plan_stats))
        .route("/api/feedback", get(feedback::list_feedback))
        .route("/api/feedback/list", get(feedback::list_feedback))
        .route("/api/feedback/summary/:expoId", get(feedback::feedback_summary))
}

/// Endpoints that require an authenticated principal.
pub fn protected_router() -> Router {
    Router::new()
        .nest("/api/user", users::router())
        .nest(
            "/api/expo",
            expos::router()
                .merge(exhibitors::router())
                .merge(floor_plans::router()),
        )
        .nest("/api/feedback", feedback::router())
        .nest("/api/chat", chat::router())
}
