use sqlx::PgPool;
use storage::{
    dto::participant::CreateParticipantRequest, error::Result, models::Participant,
    repository::score::ScoreRepository, store::PgScoreStore,
};

fn repository(pool: &PgPool) -> ScoreRepository<PgScoreStore<'_>> {
    ScoreRepository::new(PgScoreStore::new(pool))
}

/// List all participants
pub async fn list_participants(pool: &PgPool) -> Result<Vec<Participant>> {
    repository(pool).list_participants().await
}

/// Get participant by ID
pub async fn get_participant(pool: &PgPool, id: i32) -> Result<Participant> {
    repository(pool).get_participant(id).await
}

/// Register a participant
pub async fn add_participant(
    pool: &PgPool,
    request: &CreateParticipantRequest,
) -> Result<Participant> {
    repository(pool).add_participant(request).await
}

/// Remove a participant and their scores
pub async fn remove_participant(pool: &PgPool, id: i32) -> Result<()> {
    repository(pool).remove_participant(id).await
}
