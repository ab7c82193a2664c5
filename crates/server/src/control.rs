//! Host control surface: lifecycle, sync, push and cache inspection.
//!
//! | Route | Router event |
//! |---|---|
//! | `POST /sync/:tag` | `on_sync` |
//! | `POST /push` | `on_push` (body is the payload text) |
//! | `POST /notification-click` | `on_notification_click` |
//! | `POST /install`, `POST /activate` | lifecycle phases |
//! | `GET /state`, `GET /caches` | inspection |

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use birdie_core::StoreSummary;
use birdie_worker::{LifecycleState, NotificationClick, NotificationRequest, SyncOutcome};

use crate::app::AppState;
use crate::error::ServerError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sync/:tag", post(sync))
        .route("/push", post(push))
        .route("/notification-click", post(notification_click))
        .route("/install", post(install))
        .route("/activate", post(activate))
        .route("/state", get(state))
        .route("/caches", get(caches))
}

#[derive(Debug, Serialize)]
pub struct StateBody {
    pub state: LifecycleState,
}

#[derive(Debug, Serialize)]
pub struct SyncBody {
    pub tag: String,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClickBody {
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InstallBody {
    pub precached: bool,
    pub state: LifecycleState,
}

#[derive(Debug, Serialize)]
pub struct ActivateBody {
    pub deleted: Vec<String>,
    pub state: LifecycleState,
}

async fn sync(State(app): State<AppState>, Path(tag): Path<String>) -> Result<Json<SyncBody>, ServerError> {
    let outcome = app.router.on_sync(&tag).await?;
    tracing::info!(tag = %tag, ?outcome, "background sync");
    Ok(Json(SyncBody { tag, outcome }))
}

async fn push(State(app): State<AppState>, payload: String) -> Json<NotificationRequest> {
    let payload = (!payload.is_empty()).then_some(payload.as_str());
    Json(app.router.on_push(payload))
}

async fn notification_click(State(app): State<AppState>, Json(body): Json<ClickBody>) -> Json<NotificationClick> {
    Json(app.router.on_notification_click(body.action.as_deref()))
}

async fn install(State(app): State<AppState>) -> Json<InstallBody> {
    let precached = app.router.on_install().await;
    Json(InstallBody { precached, state: app.router.state().await })
}

async fn activate(State(app): State<AppState>) -> Result<Json<ActivateBody>, ServerError> {
    let deleted = app.router.on_activate().await?;
    Ok(Json(ActivateBody { deleted, state: app.router.state().await }))
}

async fn state(State(app): State<AppState>) -> Json<StateBody> {
    Json(StateBody { state: app.router.state().await })
}

async fn caches(State(app): State<AppState>) -> Result<Json<Vec<StoreSummary>>, ServerError> {
    Ok(Json(app.router.storage().summaries().await?))
}
