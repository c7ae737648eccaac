use crate::errors::AppError;
use crate::models::{LoginRequest, ScoreDraft, Session, ViewMode, ViewRequest};
use crate::state::AppState;
use crate::store::Dashboard;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.tracker.snapshot().await;
    Html(render_index(&dashboard))
}

// Form posts: outcomes land in the dashboard (including the error banner), then back to `/`.

pub async fn login_form(State(state): State<AppState>, Form(payload): Form<LoginRequest>) -> Redirect {
    if let Err(err) = state.tracker.login(&payload.username).await {
        debug!("login rejected: {err}");
    }
    Redirect::to("/")
}

pub async fn logout_form(State(state): State<AppState>) -> Redirect {
    state.tracker.logout().await;
    Redirect::to("/")
}

pub async fn view_form(State(state): State<AppState>, Path(mode): Path<String>) -> Result<Redirect, AppError> {
    let view = ViewMode::parse(&mode).ok_or_else(|| AppError::bad_request(format!("unknown view '{mode}'")))?;
    if let Err(err) = state.tracker.switch_view(view).await {
        debug!("view switch ignored: {err}");
    }
    Ok(Redirect::to("/"))
}

pub async fn open_add_form(State(state): State<AppState>) -> Redirect {
    if let Err(err) = state.tracker.open_add().await {
        debug!("add ignored: {err}");
    }
    Redirect::to("/")
}

pub async fn open_edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    if let Err(err) = state.tracker.open_edit(&id).await {
        debug!("edit ignored: {err}");
    }
    Redirect::to("/")
}

pub async fn cancel_form(State(state): State<AppState>) -> Redirect {
    state.tracker.cancel_form().await;
    Redirect::to("/")
}

pub async fn submit_form(State(state): State<AppState>, Form(draft): Form<ScoreDraft>) -> Redirect {
    if let Err(err) = state.tracker.submit(draft).await {
        debug!("submit rejected: {err}");
    }
    Redirect::to("/")
}

// JSON API

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(state.tracker.snapshot().await)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.tracker.login(&payload.username).await?;
    Ok(Json(session))
}

pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.tracker.logout().await;
    StatusCode::NO_CONTENT
}

pub async fn switch_view(
    State(state): State<AppState>,
    Json(payload): Json<ViewRequest>,
) -> Result<Json<Dashboard>, AppError> {
    state.tracker.switch_view(payload.mode).await?;
    Ok(Json(state.tracker.snapshot().await))
}

pub async fn add_score(
    State(state): State<AppState>,
    Json(draft): Json<ScoreDraft>,
) -> Result<(StatusCode, Json<Dashboard>), AppError> {
    state.tracker.open_add().await?;
    state.tracker.submit(draft).await?;
    Ok((StatusCode::CREATED, Json(state.tracker.snapshot().await)))
}

pub async fn edit_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ScoreDraft>,
) -> Result<Json<Dashboard>, AppError> {
    state.tracker.open_edit(&id).await?;
    state.tracker.submit(draft).await?;
    Ok(Json(state.tracker.snapshot().await))
}
