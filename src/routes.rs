// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{leaderboard, quiz_answer, quiz_attempt, session},
    state::AppState,
    utils::jwt::{USER_ID_HEADER, admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public: leaderboards and session status.
/// * Authenticated: submissions, own attempts and answers.
/// * Admin: session windows.
/// * Global middleware: Trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let public_attempt_routes = Router::new()
        .route("/leaderboard/daily", get(leaderboard::daily_leaderboard))
        .route(
            "/leaderboard/daily/aggregate",
            get(leaderboard::aggregate_leaderboard),
        )
        .route(
            "/session",
            get(session::get_session).merge(
                // Auth first, then Admin check
                post(session::upsert_session)
                    .route_layer(middleware::from_fn(admin_middleware))
                    .route_layer(auth.clone()),
            ),
        );

    let protected_attempt_routes = Router::new()
        .route(
            "/",
            post(quiz_attempt::create_attempt).get(quiz_attempt::list_my_attempts),
        )
        .route("/submit", post(quiz_attempt::submit_batch))
        .route("/daily", get(quiz_attempt::my_daily_attempt))
        .route_layer(auth.clone());

    let answer_routes = Router::new()
        .route(
            "/",
            post(quiz_answer::submit_answer).get(quiz_answer::list_my_answers),
        )
        .route_layer(auth);

    Router::new()
        .nest(
            "/api/quiz-attempts",
            public_attempt_routes.merge(protected_attempt_routes),
        )
        .nest("/api/quiz-answers", answer_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
