use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login_form))
        .route("/logout", post(handlers::logout_form))
        .route("/view/:mode", post(handlers::view_form))
        .route("/scores", post(handlers::submit_form))
        .route("/scores/new", post(handlers::open_add_form))
        .route("/scores/cancel", post(handlers::cancel_form))
        .route("/scores/:id/edit", post(handlers::open_edit_form))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/view", post(handlers::switch_view))
        .route("/api/scores", post(handlers::add_score))
        .route("/api/scores/:id", put(handlers::edit_score))
        .with_state(state)
}
