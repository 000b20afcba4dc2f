use sqlx::PgPool;
use storage::{
    dto::score::{ParticipantSummary, SummaryParams, UpsertScoreRequest},
    error::Result,
    models::{Event, Score},
    repository::score::ScoreRepository,
    services::aggregation,
    store::PgScoreStore,
};
use validator::Validate;

fn repository(pool: &PgPool) -> ScoreRepository<PgScoreStore<'_>> {
    ScoreRepository::new(PgScoreStore::new(pool))
}

/// List scores, optionally for one participant
pub async fn list_scores(pool: &PgPool, participant_id: Option<i32>) -> Result<Vec<Score>> {
    repository(pool).list_scores(participant_id).await
}

/// Insert or update the score of a (participant, event, date) triple
pub async fn upsert_score(pool: &PgPool, request: &UpsertScoreRequest) -> Result<Score> {
    repository(pool).upsert_score(request).await
}

/// Per-participant totals and averages for one event
pub async fn summarize(pool: &PgPool, params: &SummaryParams) -> Result<Vec<ParticipantSummary>> {
    params.validate()?;
    let event: Event = params.event.parse()?;
    let filter = params.date_filter()?;

    let repo = repository(pool);
    let participants = repo.list_participants().await?;
    let scores = repo.list_scores(None).await?;

    Ok(aggregation::summarize(
        &participants,
        &scores,
        event,
        Some(&filter),
    ))
}
