//! Axum route handlers for the agent core HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`: liveness probe
//! - `GET  /state`: session snapshot
//! - `POST /input`: universal input `{text, view?}`
//! - `POST /view`: view change `{view}`
//! - `POST /mode`: explicit switch `{mode, reason?}`
//! - `POST /suggestion`: propose `{mode}`
//! - `POST /suggestion/confirm`: confirm the pending suggestion
//! - `POST /suggestion/dismiss`: dismiss it
//! - `GET  /personas`, `POST /personas`: list / create custom persona
//! - `DELETE /personas/:id`, `POST /personas/:id/select`
//! - `GET  /skills`, `POST /skills/:id/xp`, `POST /skills/:id/train`
//! - `POST /agent/feed`: `{amount}`
//! - `GET  /journeys`, `POST /journeys/:id/start`
//! - `POST /journey/advance`, `POST /journey/complete`
//! - `POST /system/crash`, `POST /system/heal`, `POST /system/diagnostics`
//! - `GET  /actions`, `POST /actions/extract`, `POST /actions/:id/sync`
//! - `GET  /logs`, `POST /logs`, `POST /logs/clear`, `POST /logs/archive`, `GET /logs/export`
//! - `PUT  /theme`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::actions::ActionItem;
use crate::core::{AgentCore, DiagnosticsReport, InputOutcome, SharedCore, ThemePreferences};
use crate::health::HealthState;
use crate::journey::{journey_templates, Journey, JourneyStarted};
use crate::logs::{LogEntry, LogSource, LogType};
use crate::persona::{AgentMode, Persona, PersonaDraft};
use crate::skills::{AgentLevel, Skill, SkillAward};
use crate::utilities::errors::CoreError;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub core: SharedCore,
}

impl AppState {
    pub fn new(core: SharedCore) -> Self {
        Self { core }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(err: CoreError) -> ApiError {
    let status = match err {
        CoreError::InvalidPersona { .. } => StatusCode::BAD_REQUEST,
        CoreError::UnknownSkill { .. } | CoreError::UnknownJourney { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

fn changed(value: bool) -> Json<Value> {
    Json(json!({ "changed": value }))
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/state", get(state_handler))
        .route("/input", post(input_handler))
        .route("/view", post(view_handler))
        .route("/mode", post(mode_handler))
        .route("/suggestion", post(propose_handler))
        .route("/suggestion/confirm", post(confirm_handler))
        .route("/suggestion/dismiss", post(dismiss_handler))
        .route("/personas", get(list_personas_handler).post(create_persona_handler))
        .route("/personas/:id", delete(delete_persona_handler))
        .route("/personas/:id/select", post(select_persona_handler))
        .route("/skills", get(list_skills_handler))
        .route("/skills/:id/xp", post(award_skill_handler))
        .route("/skills/:id/train", post(train_skill_handler))
        .route("/agent/feed", post(feed_handler))
        .route("/journeys", get(list_journeys_handler))
        .route("/journeys/:id/start", post(start_journey_handler))
        .route("/journey/advance", post(advance_journey_handler))
        .route("/journey/complete", post(complete_journey_handler))
        .route("/system/crash", post(crash_handler))
        .route("/system/heal", post(heal_handler))
        .route("/system/diagnostics", post(diagnostics_handler))
        .route("/actions", get(list_actions_handler))
        .route("/actions/extract", post(extract_action_handler))
        .route("/actions/:id/sync", post(sync_action_handler))
        .route("/logs", get(list_logs_handler).post(add_log_handler))
        .route("/logs/clear", post(clear_logs_handler))
        .route("/logs/archive", post(archive_logs_handler))
        .route("/logs/export", get(export_logs_handler))
        .route("/theme", put(theme_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: AgentMode,
    pub pending_suggestion: Option<AgentMode>,
    pub persona: Persona,
    pub health: HealthState,
    pub agent_level: AgentLevel,
    pub active_journey: Option<Journey>,
    pub current_instruction: Option<String>,
    pub view: Option<String>,
    pub theme: ThemePreferences,
}

impl SessionSnapshot {
    fn of(core: &AgentCore) -> Self {
        Self {
            mode: core.mode(),
            pending_suggestion: core.pending_suggestion(),
            persona: core.active_persona(),
            health: core.health(),
            agent_level: core.agent_level(),
            active_journey: core.active_journey().cloned(),
            current_instruction: core.current_instruction().map(str::to_string),
            view: core.view().map(str::to_string),
            theme: core.theme().clone(),
        }
    }
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "adaptive-agent-core",
    }))
}

async fn state_handler(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(SessionSnapshot::of(&state.core.lock()))
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
    #[serde(default)]
    pub view: Option<String>,
}

async fn input_handler(State(state): State<AppState>, Json(req): Json<InputRequest>) -> Json<InputOutcome> {
    Json(state.core.lock().process_universal_input(&req.text, req.view.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: String,
}

async fn view_handler(State(state): State<AppState>, Json(req): Json<ViewRequest>) -> Json<Value> {
    let suggestion = state.core.lock().set_view(&req.view);
    Json(json!({ "suggestion": suggestion }))
}

// ---------------------------------------------------------------------------
// Modes and personas
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: AgentMode,
    #[serde(default)]
    pub reason: Option<String>,
}

async fn mode_handler(State(state): State<AppState>, Json(req): Json<ModeRequest>) -> Json<Value> {
    let mut core = state.core.lock();
    let switched = core.switch_mode(req.mode, req.reason.as_deref().unwrap_or("api request"));
    Json(json!({ "changed": switched, "mode": core.mode() }))
}

async fn propose_handler(State(state): State<AppState>, Json(req): Json<ModeRequest>) -> Json<Value> {
    changed(state.core.lock().propose_suggestion(req.mode))
}

async fn confirm_handler(State(state): State<AppState>) -> Json<Value> {
    changed(state.core.lock().confirm_suggestion())
}

async fn dismiss_handler(State(state): State<AppState>) -> Json<Value> {
    changed(state.core.lock().dismiss_suggestion())
}

async fn list_personas_handler(State(state): State<AppState>) -> Json<Vec<Persona>> {
    Json(state.core.lock().personas())
}

async fn create_persona_handler(
    State(state): State<AppState>,
    Json(draft): Json<PersonaDraft>,
) -> Result<(StatusCode, Json<Persona>), ApiError> {
    let persona = state.core.lock().add_custom_agent(draft).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(persona)))
}

async fn delete_persona_handler(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    changed(state.core.lock().delete_custom_agent(&id))
}

async fn select_persona_handler(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    changed(state.core.lock().select_custom_agent(&id))
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: u64,
}

async fn list_skills_handler(State(state): State<AppState>) -> Json<Vec<Skill>> {
    Json(state.core.lock().skills().to_vec())
}

async fn award_skill_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<SkillAward>, ApiError> {
    state
        .core
        .lock()
        .award_skill_xp(&id, req.amount)
        .map(Json)
        .ok_or_else(|| api_error(CoreError::UnknownSkill { skill_id: id }))
}

async fn train_skill_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SkillAward>, ApiError> {
    state
        .core
        .lock()
        .train_skill(&id)
        .map(Json)
        .ok_or_else(|| api_error(CoreError::UnknownSkill { skill_id: id }))
}

async fn feed_handler(State(state): State<AppState>, Json(req): Json<AmountRequest>) -> Json<Value> {
    let mut core = state.core.lock();
    let gain = core.feed_agent(req.amount);
    Json(json!({ "levelUp": gain, "agentLevel": core.agent_level() }))
}

// ---------------------------------------------------------------------------
// Journeys
// ---------------------------------------------------------------------------

async fn list_journeys_handler() -> Json<Vec<Journey>> {
    Json(journey_templates())
}

async fn start_journey_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JourneyStarted>, ApiError> {
    state.core.lock().start_journey(&id).map(Json).map_err(api_error)
}

async fn advance_journey_handler(State(state): State<AppState>) -> Json<Value> {
    changed(state.core.lock().advance_journey())
}

async fn complete_journey_handler(State(state): State<AppState>) -> Json<Value> {
    changed(state.core.lock().complete_journey())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn crash_handler(State(state): State<AppState>) -> Json<Value> {
    let mut core = state.core.lock();
    let accepted = core.trigger_system_crash();
    Json(json!({ "changed": accepted, "health": core.health() }))
}

async fn heal_handler(State(state): State<AppState>) -> Json<Value> {
    let mut core = state.core.lock();
    let accepted = core.initiate_self_healing();
    Json(json!({ "changed": accepted, "health": core.health() }))
}

async fn diagnostics_handler(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(state.core.lock().run_self_diagnostics())
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

async fn list_actions_handler(State(state): State<AppState>) -> Json<Vec<ActionItem>> {
    Json(state.core.lock().actions().to_vec())
}

async fn extract_action_handler(State(state): State<AppState>, Json(req): Json<TextRequest>) -> Json<Option<ActionItem>> {
    Json(state.core.lock().extract_action_from_text(&req.text))
}

async fn sync_action_handler(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    changed(state.core.lock().mark_action_synced(&id))
}

// ---------------------------------------------------------------------------
// Logs and theme
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub message: String,
    #[serde(rename = "type", default = "default_log_type")]
    pub log_type: LogType,
    #[serde(default = "default_log_source")]
    pub source: LogSource,
}

fn default_log_type() -> LogType {
    LogType::Info
}

fn default_log_source() -> LogSource {
    LogSource::System
}

async fn list_logs_handler(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.core.lock().logs().entries().to_vec())
}

async fn add_log_handler(State(state): State<AppState>, Json(req): Json<LogRequest>) -> (StatusCode, Json<LogEntry>) {
    let entry = state.core.lock().add_log(req.message, req.log_type, req.source);
    (StatusCode::CREATED, Json(entry))
}

async fn clear_logs_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "cleared": state.core.lock().clear_logs() }))
}

async fn archive_logs_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "archived": state.core.lock().archive_logs() }))
}

async fn export_logs_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.core.lock().export_logs_json().map_err(api_error)?;
    Ok(([(axum::http::header::CONTENT_TYPE, "application/json")], body))
}

async fn theme_handler(State(state): State<AppState>, Json(theme): Json<ThemePreferences>) -> Json<Value> {
    changed(state.core.lock().set_theme(theme))
}
