use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::score::{EventInfo, ListScoresParams, ParticipantSummary, SummaryParams, UpsertScoreRequest},
    models::{Event, Score},
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/scores",
    params(ListScoresParams),
    responses(
        (status = 200, description = "Scores, optionally filtered by participant", body = Vec<Score>)
    ),
    tag = "scores"
)]
pub async fn list_scores(
    State(db): State<Database>,
    params: Result<Query<ListScoresParams>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(params) = params?;

    let scores = services::list_scores(db.pool(), params.participant_id).await?;

    Ok(Json(scores).into_response())
}

#[utoipa::path(
    put,
    path = "/api/scores",
    request_body = UpsertScoreRequest,
    responses(
        (status = 200, description = "Score stored; same row ID when the triple already existed", body = Score),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Participant not found")
    ),
    tag = "scores"
)]
pub async fn upsert_score(
    State(db): State<Database>,
    payload: Result<Json<UpsertScoreRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;

    let score = services::upsert_score(db.pool(), &req).await?;

    Ok(Json(score).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores/summary",
    params(SummaryParams),
    responses(
        (status = 200, description = "Totals and averages per participant", body = Vec<ParticipantSummary>),
        (status = 400, description = "Invalid event or date filter")
    ),
    tag = "scores"
)]
pub async fn get_summary(
    State(db): State<Database>,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(params) = params?;

    let summary = services::summarize(db.pool(), &params).await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Recognized exercise events", body = Vec<EventInfo>)
    ),
    tag = "scores"
)]
pub async fn list_events() -> Json<Vec<EventInfo>> {
    Json(Event::ALL.into_iter().map(EventInfo::from).collect())
}
