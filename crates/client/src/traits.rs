use async_trait::async_trait;
use storage::{
    dto::{participant::CreateParticipantRequest, score::UpsertScoreRequest},
    models::{Participant, Score},
    repository::score::ScoreRepository,
    store::ScoreStore,
};

use crate::Result;

/// The participant and score operations a front end needs, wherever they run.
#[async_trait]
pub trait ScoreApi: Send + Sync {
    async fn list_participants(&self) -> Result<Vec<Participant>>;

    async fn add_participant(&self, request: &CreateParticipantRequest) -> Result<Participant>;

    async fn remove_participant(&self, id: i32) -> Result<()>;

    async fn upsert_score(&self, request: &UpsertScoreRequest) -> Result<Score>;

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>>;
}

/// In-process wiring straight onto a repository.
#[async_trait]
impl<S: ScoreStore> ScoreApi for ScoreRepository<S> {
    async fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(ScoreRepository::list_participants(self).await?)
    }

    async fn add_participant(&self, request: &CreateParticipantRequest) -> Result<Participant> {
        Ok(ScoreRepository::add_participant(self, request).await?)
    }

    async fn remove_participant(&self, id: i32) -> Result<()> {
        Ok(ScoreRepository::remove_participant(self, id).await?)
    }

    async fn upsert_score(&self, request: &UpsertScoreRequest) -> Result<Score> {
        Ok(ScoreRepository::upsert_score(self, request).await?)
    }

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>> {
        Ok(ScoreRepository::list_scores(self, participant_id).await?)
    }
}
