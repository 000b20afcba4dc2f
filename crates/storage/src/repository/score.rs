use validator::Validate;

use crate::dto::participant::CreateParticipantRequest;
use crate::dto::score::UpsertScoreRequest;
use crate::error::{Result, StorageError};
use crate::models::{Event, NewScore, Participant, Score, ScoreKey};
use crate::store::ScoreStore;

/// Participant and score operations on top of a [`ScoreStore`].
///
/// Validates input before it reaches the store; uniqueness and the
/// participant reference are left to the store's constraints.
pub struct ScoreRepository<S> {
    store: S,
}

impl<S: ScoreStore> ScoreRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// List all participants
    pub async fn list_participants(&self) -> Result<Vec<Participant>> {
        self.store.list_participants().await
    }

    /// Find participant by ID
    pub async fn get_participant(&self, id: i32) -> Result<Participant> {
        self.store
            .find_participant(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Participant {} does not exist", id)))
    }

    /// Register a new participant
    pub async fn add_participant(&self, req: &CreateParticipantRequest) -> Result<Participant> {
        let req = req.trimmed();
        req.validate()?;

        let participant = self.store.insert_participant(&req.name, &req.email).await?;
        tracing::debug!(participant_id = participant.id, "participant added");

        Ok(participant)
    }

    /// Delete a participant together with all of their scores.
    ///
    /// Deleting an unknown ID is a no-op.
    pub async fn remove_participant(&self, id: i32) -> Result<()> {
        let removed = self.store.delete_participant(id).await?;

        if removed.participants == 0 {
            tracing::debug!(participant_id = id, "participant already absent");
        } else {
            tracing::debug!(
                participant_id = id,
                scores = removed.scores,
                "participant removed"
            );
        }

        Ok(())
    }

    /// Record a score, replacing the value already stored for the same
    /// participant, event and date.
    pub async fn upsert_score(&self, req: &UpsertScoreRequest) -> Result<Score> {
        req.validate()?;
        let event: Event = req.event.parse()?;

        let new_score = NewScore {
            key: ScoreKey {
                participant_id: req.participant_id,
                event,
                date: req.date,
            },
            score: req.score,
        };

        let score = self.store.upsert_score(&new_score).await?;
        tracing::debug!(
            score_id = score.id,
            participant_id = score.participant_id,
            event = %score.event,
            date = %score.date,
            value = score.score,
            "score upserted"
        );

        Ok(score)
    }

    /// List scores, optionally restricted to one participant
    pub async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>> {
        self.store.list_scores(participant_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::store::MemoryScoreStore;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    async fn repo_with_ann() -> (ScoreRepository<MemoryScoreStore>, Participant) {
        let repo = ScoreRepository::new(MemoryScoreStore::new());
        let ann = repo
            .add_participant(&CreateParticipantRequest::new("Ann", "ann@example.com"))
            .await
            .unwrap();
        (repo, ann)
    }

    #[tokio::test]
    async fn test_add_participant_assigns_id() {
        let (repo, ann) = repo_with_ann().await;

        assert!(ann.id > 0);
        assert_eq!(ann.name, "Ann");
        assert_eq!(repo.get_participant(ann.id).await.unwrap(), ann);
    }

    #[tokio::test]
    async fn test_add_participant_rejects_empty_fields() {
        let repo = ScoreRepository::new(MemoryScoreStore::new());

        let err = repo
            .add_participant(&CreateParticipantRequest::new("", "ann@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = repo
            .add_participant(&CreateParticipantRequest::new("Ann", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        assert!(repo.list_participants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_without_insert() {
        let (repo, _) = repo_with_ann().await;

        let err = repo
            .add_participant(&CreateParticipantRequest::new("Ann B", "ann@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(repo.list_participants().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_upserts_leave_one_row_with_last_value() {
        let (repo, ann) = repo_with_ann().await;

        let mut ids = Vec::new();
        for value in [3, 8, 0, 21] {
            let req = UpsertScoreRequest::new(ann.id, Event::Pushup60s, value, date(5));
            ids.push(repo.upsert_score(&req).await.unwrap().id);
        }

        let scores = repo.list_scores(Some(ann.id)).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 21);
        assert!(ids.iter().all(|id| *id == scores[0].id));
    }

    #[tokio::test]
    async fn test_same_date_different_event_is_a_new_row() {
        let (repo, ann) = repo_with_ann().await;

        let pushups = repo
            .upsert_score(&UpsertScoreRequest::new(ann.id, Event::Pushup60s, 30, date(1)))
            .await
            .unwrap();
        let pullups = repo
            .upsert_score(&UpsertScoreRequest::new(ann.id, Event::PullupMax, 8, date(1)))
            .await
            .unwrap();

        assert_ne!(pushups.id, pullups.id);
        assert_eq!(repo.list_scores(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_validation_and_missing_participant() {
        let (repo, ann) = repo_with_ann().await;

        let negative = UpsertScoreRequest::new(ann.id, Event::Pushup60s, -5, date(1));
        assert!(matches!(
            repo.upsert_score(&negative).await,
            Err(StorageError::Validation(_))
        ));

        let mut unknown = UpsertScoreRequest::new(ann.id, Event::Pushup60s, 5, date(1));
        unknown.event = "plank_hold".into();
        assert!(matches!(
            repo.upsert_score(&unknown).await,
            Err(StorageError::Validation(_))
        ));

        let orphan = UpsertScoreRequest::new(ann.id + 100, Event::Pushup60s, 5, date(1));
        assert!(matches!(
            repo.upsert_score(&orphan).await,
            Err(StorageError::NotFound(_))
        ));

        assert!(repo.list_scores(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_participant_cascades_and_is_idempotent() {
        let (repo, ann) = repo_with_ann().await;
        for day in 1..=3 {
            repo.upsert_score(&UpsertScoreRequest::new(ann.id, Event::Pushup60s, 10, date(day)))
                .await
                .unwrap();
        }

        repo.remove_participant(ann.id).await.unwrap();
        repo.remove_participant(ann.id).await.unwrap();

        assert!(repo.list_scores(Some(ann.id)).await.unwrap().is_empty());
        assert!(matches!(
            repo.get_participant(ann.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_on_one_triple_keep_one_row() {
        let (repo, ann) = repo_with_ann().await;
        let repo = Arc::new(repo);
        let participant_id = ann.id;

        let mut handles = Vec::new();
        for value in 1..=16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let req = UpsertScoreRequest::new(participant_id, Event::PullupMax, value, date(9));
                repo.upsert_score(&req).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let scores = repo.list_scores(Some(participant_id)).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert!((1..=16).contains(&scores[0].score));
    }
}
