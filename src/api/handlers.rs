//! HTTP endpoint handlers

use std::{path::PathBuf, sync::Arc};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    commands::Action,
    engine::{DisplayFrame, EditOutcome},
    state::{accepts_numeric_input, AppState, ColorField, ConfigEdit, NumericField},
};
use super::responses::{
    ActionResponse, ConfigRequest, ConfigResponse, ExtendRequest, FieldOutcome, FocusRequest,
    HealthResponse, StatusResponse,
};

async fn run_action(state: &AppState, action: Action) -> Result<Json<ActionResponse>, StatusCode> {
    match state.send_action(action).await {
        Ok(clock) => {
            info!("{} endpoint called - clock at {}s", action, clock.remaining_seconds);
            Ok(Json(ActionResponse::new(
                format!("{} applied", action),
                clock,
            )))
        }
        Err(e) => {
            error!("Failed to apply {}: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /start-game - Stage the opening value of a game
pub async fn start_game_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&state, Action::StartGame).await
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&state, Action::Start).await
}

/// Handle POST /pause - Stop the countdown, keeping the remaining time
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&state, Action::Pause).await
}

/// Handle POST /reset - Stop and load the shot duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&state, Action::Reset).await
}

/// Handle POST /extend - Add time, the configured extension by default
pub async fn extend_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ActionResponse>, StatusCode> {
    let amount = extend_amount(&body).map_err(|rejection| {
        warn!("Rejected extend request: {}", rejection.body_text());
        rejection.status()
    })?;
    run_action(&state, Action::Extend(amount)).await
}

/// Handle POST /quit - Stop the clock and shut the server down
pub async fn quit_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&state, Action::Quit).await
}

/// Handle PUT /config - Edit configuration while the clock is stopped
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigRequest>,
) -> Result<Json<ConfigResponse>, StatusCode> {
    let edits = config_edits(request).map_err(|field| {
        warn!("Rejected non-numeric input for {}", field);
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    let fields: Vec<&'static str> = edits.iter().map(|edit| edit.field_name()).collect();
    let (outcomes, clock) = match state.edit_config(edits).await {
        Ok(result) => result,
        Err(e) => {
            error!("Failed to edit config: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let applied = outcomes.iter().all(|o| *o == EditOutcome::Applied);
    Ok(Json(ConfigResponse {
        applied,
        fields: fields
            .iter()
            .zip(&outcomes)
            .map(|(field, outcome)| FieldOutcome::new(field, outcome))
            .collect(),
        timestamp: Utc::now(),
        clock,
    }))
}

/// Handle POST /config/focus - Switch between edit and hotkey mode
pub async fn focus_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FocusRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    match state.set_focus(request.focused).await {
        Ok(clock) => Ok(Json(ActionResponse::new(clock.mode_label.clone(), clock))),
        Err(e) => {
            error!("Failed to change focus: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - Return current clock status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        clock: state.get_snapshot(),
        displays: state.display_names(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /display/:name - Latest frame of a display surface
pub async fn display_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DisplayFrame>, StatusCode> {
    state.get_display(&name).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Amount requested by an extend body. Only an empty body means "use the
/// configured extension"; anything else must be a valid request.
fn extend_amount(body: &[u8]) -> Result<Option<u32>, JsonRejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let Json(request) = Json::<ExtendRequest>::from_bytes(body)?;
    Ok(request.amount)
}

/// Turn a config request into edits, rejecting non-digit numeric input.
/// Returns the offending field name on rejection.
fn config_edits(request: ConfigRequest) -> Result<Vec<ConfigEdit>, &'static str> {
    let mut edits = Vec::new();

    let numeric = [
        (NumericField::StartValue, request.start_value),
        (NumericField::ShotDuration, request.shot_duration),
        (NumericField::ExtensionAmount, request.extension_amount),
        (NumericField::AlertThreshold, request.alert_threshold),
    ];
    for (field, raw) in numeric {
        if let Some(raw) = raw {
            if !accepts_numeric_input(&raw) {
                return Err(field.name());
            }
            edits.push(ConfigEdit::Numeric(field, raw));
        }
    }

    if let Some(token) = request.normal_color {
        edits.push(ConfigEdit::Color(ColorField::Normal, token));
    }
    if let Some(token) = request.alert_color {
        edits.push(ConfigEdit::Color(ColorField::Alert, token));
    }
    if let Some(path) = request.alert_sound {
        let path = path.trim();
        let sound = (!path.is_empty()).then(|| PathBuf::from(path));
        edits.push(ConfigEdit::AlertSound(sound));
    }
    if let Some(enabled) = request.alerts_enabled {
        edits.push(ConfigEdit::AlertsEnabled(enabled));
    }
    if let Some(policy) = request.alert_policy {
        edits.push(ConfigEdit::AlertPolicy(policy));
    }

    Ok(edits)
}
