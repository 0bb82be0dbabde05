//! JSON REST handlers for actuator commands.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use greencue_app::ports::{CommandStore, DeviceTransport, LatestValueCache, ReadingStore, RuleStore};
use greencue_app::services::DEFAULT_RECENT_LIMIT;
use greencue_domain::control::{ControlCommand, ControlTarget};

use crate::api::automation::parse_rule_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a manual command.
#[derive(Deserialize)]
pub struct CommandRequest {
    pub target: String,
    pub command: String,
    pub value: Option<f32>,
}

/// Query parameters of the "recent" endpoint.
#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

/// Possible responses from the command endpoint.
pub enum CommandResponse {
    Created(Json<ControlCommand>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /api/control/command`: persist and publish a manual command.
pub async fn execute<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Json(req): Json<CommandRequest>,
) -> Result<CommandResponse, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let command = state
        .command_service
        .execute_manual_command(&req.target, &req.command, req.value)
        .await?;
    Ok(CommandResponse::Created(Json(command)))
}

/// `GET /api/control/{target}/recent?limit=`: newest commands first.
pub async fn recent<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(target): Path<String>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<ControlCommand>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let target: ControlTarget = target.parse()?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let commands = state
        .command_service
        .list_recent_commands(target, limit)
        .await?;
    Ok(Json(commands))
}

/// `GET /api/control/rule/{rule_id}`: commands a rule produced.
pub async fn by_rule<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(rule_id): Path<String>,
) -> Result<Json<Vec<ControlCommand>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&rule_id)?;
    let commands = state.command_service.list_commands_by_rule(rule_id).await?;
    Ok(Json(commands))
}

/// `GET /api/control/targets`: the control target codes.
pub async fn targets() -> Json<Vec<&'static str>> {
    Json(ControlTarget::ALL.into_iter().map(ControlTarget::code).collect())
}
