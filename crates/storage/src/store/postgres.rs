use async_trait::async_trait;
use sqlx::PgPool;

use super::{RemovedRows, ScoreStore};
use crate::error::{Result, StorageError};
use crate::models::{NewScore, Participant, Score};

pub struct PgScoreStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgScoreStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore<'_> {
    async fn insert_participant(&self, name: &str, email: &str) -> Result<Participant> {
        sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::Conflict(format!("Email '{}' is already registered", email))
            } else {
                err
            }
        })
    }

    async fn find_participant(&self, id: i32) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM participants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(participant)
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM participants
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    async fn delete_participant(&self, id: i32) -> Result<RemovedRows> {
        let mut tx = self.pool.begin().await?;

        let scores = sqlx::query("DELETE FROM score WHERE participant_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let participants = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(RemovedRows {
            participants,
            scores,
        })
    }

    async fn upsert_score(&self, score: &NewScore) -> Result<Score> {
        // The unique index on the triple arbitrates concurrent writers.
        sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO score (participant_id, event, score, date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (participant_id, event, date)
            DO UPDATE SET
                score = EXCLUDED.score,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id, participant_id, event, score, date, created_at, updated_at
            "#,
        )
        .bind(score.key.participant_id)
        .bind(score.key.event)
        .bind(score.score)
        .bind(score.key.date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_foreign_key_violation() {
                StorageError::NotFound(format!(
                    "Participant {} does not exist",
                    score.key.participant_id
                ))
            } else {
                err
            }
        })
    }

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"
            SELECT id, participant_id, event, score, date, created_at, updated_at
            FROM score
            WHERE ($1::integer IS NULL OR participant_id = $1)
            ORDER BY date, participant_id, event
            "#,
        )
        .bind(participant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }
}
