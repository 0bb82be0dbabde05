//! JSON REST handlers for automation rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use greencue_app::ports::{CommandStore, DeviceTransport, LatestValueCache, ReadingStore, RuleStore};
use greencue_domain::automation::{AutomationRule, NewRule};
use greencue_domain::error::ValidationError;
use greencue_domain::id::RuleId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub condition: String,
    pub action: String,
    pub active: Option<bool>,
}

/// Query parameters of the toggle endpoint.
#[derive(Deserialize)]
pub struct ToggleParams {
    pub active: bool,
}

/// Possible responses from the create endpoints.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

pub(crate) fn parse_rule_id(raw: &str) -> Result<RuleId, ValidationError> {
    RuleId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

/// `POST /api/automation/rule`: create a rule from condition and action strings.
pub async fn create<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let mut rule = NewRule::new(req.condition, req.action);
    if let Some(active) = req.active {
        rule = rule.active(active);
    }
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `POST /api/automation/natural-language`: create a rule from a phrase.
///
/// The body is the phrase itself as plain text.
pub async fn create_from_natural_language<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    body: String,
) -> Result<CreateResponse, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let created = state
        .rule_service
        .create_rule_from_natural_language(body.trim())
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/automation/rules/active`: rules currently evaluated.
pub async fn list_active<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
) -> Result<Json<Vec<AutomationRule>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let rules = state.rule_service.list_active_rules().await?;
    Ok(Json(rules))
}

/// `GET /api/automation/rule/{id}`: get rule by ID.
pub async fn get<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(id): Path<String>,
) -> Result<Json<AutomationRule>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;
    Ok(Json(rule))
}

/// `PUT /api/automation/rule/{id}/toggle?active=`: set the active flag.
pub async fn toggle<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(id): Path<String>,
    Query(params): Query<ToggleParams>,
) -> Result<Json<AutomationRule>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.toggle_rule(rule_id, params.active).await?;
    Ok(Json(rule))
}

/// `GET /api/automation/examples`: phrases the natural-language endpoint understands.
pub async fn examples<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
) -> Json<&'static [&'static str]>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    Json(state.rule_service.examples())
}
