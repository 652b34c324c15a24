// HTTP handlers and routing for the admin surface.

use std::time::Duration;

use axum::extract::rejection::FormRejection;
use axum::extract::State as AxumState;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use machine_core::discovery::discover;
use tracing::warn;

use crate::app::AppState;
use crate::constants::REDIRECT_SETTLE_MS;

mod render;
mod types;

use render::AdminPage;
use types::*;

const INDEX_HTML: &str = include_str!("static/index.html");
const ADMIN_CSS: &str = include_str!("static/admin.css");

const MACHINE_UPDATE_FAILED: &str = "Error when updating machine settings";
const SCOREBOARD_UPDATE_FAILED: &str = "Error when updating scoreboard settings";

type UpdateResult = Result<Redirect, (StatusCode, &'static str)>;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/admin.css", get(admin_css))
        .route("/health", get(health))
        .route("/admin", get(admin))
        .route("/updateMachine", post(update_machine))
        .route("/updateScoreboard", post(update_scoreboard))
        .with_state(app_state)
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn admin_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], ADMIN_CSS)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn admin(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let settings = app_state.store.current().await;
    let warnings = app_state.store.warnings().await;
    let devices = discover(&app_state.device_dir);
    Html(
        AdminPage {
            settings: &settings,
            warnings: &warnings,
            devices: &devices,
        }
        .render(),
    )
}

async fn update_machine(
    AxumState(app_state): AxumState<AppState>,
    form: Result<Form<MachineForm>, FormRejection>,
) -> UpdateResult {
    let Form(form) = form.map_err(|err| {
        warn!(%err, "unreadable machine form");
        (StatusCode::BAD_REQUEST, MACHINE_UPDATE_FAILED)
    })?;
    let proposed = form.as_input().into_proposed().map_err(|err| {
        warn!(%err, "invalid machine form input");
        (StatusCode::BAD_REQUEST, MACHINE_UPDATE_FAILED)
    })?;

    app_state
        .coordinator
        .apply_machine_update(proposed)
        .await
        .map_err(|err| {
            warn!(%err, "machine update failed");
            (StatusCode::BAD_REQUEST, MACHINE_UPDATE_FAILED)
        })?;

    redirect_to_admin().await
}

async fn update_scoreboard(
    AxumState(app_state): AxumState<AppState>,
    form: Result<Form<ScoreboardForm>, FormRejection>,
) -> UpdateResult {
    let Form(form) = form.map_err(|err| {
        warn!(%err, "unreadable scoreboard form");
        (StatusCode::BAD_REQUEST, SCOREBOARD_UPDATE_FAILED)
    })?;
    let proposed = form.as_input().into_proposed();

    app_state
        .coordinator
        .apply_scoreboard_update(proposed)
        .await
        .map_err(|err| {
            warn!(%err, "scoreboard update failed");
            (StatusCode::BAD_REQUEST, SCOREBOARD_UPDATE_FAILED)
        })?;

    redirect_to_admin().await
}

/// Gives reconnected transports a moment before the admin page is re-rendered.
async fn redirect_to_admin() -> UpdateResult {
    tokio::time::sleep(Duration::from_millis(REDIRECT_SETTLE_MS)).await;
    Ok(Redirect::to("/admin"))
}
