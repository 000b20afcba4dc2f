//! Persistence boundary for participants and scores.
//!
//! A store owns the uniqueness rules: one participant per email, one score per
//! (participant, event, date) triple, and no score without its participant.

mod memory;
mod postgres;

pub use memory::MemoryScoreStore;
pub use postgres::PgScoreStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewScore, Participant, Score};

/// Rows removed by a participant deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedRows {
    pub participants: u64,
    pub scores: u64,
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert a participant; a duplicate email is a `Conflict` and inserts nothing.
    async fn insert_participant(&self, name: &str, email: &str) -> Result<Participant>;

    async fn find_participant(&self, id: i32) -> Result<Option<Participant>>;

    async fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Delete the participant's scores, then the participant, as one unit.
    async fn delete_participant(&self, id: i32) -> Result<RemovedRows>;

    /// Insert the score, or update the row already holding its triple.
    ///
    /// Must be atomic per triple: concurrent callers never create a second row.
    async fn upsert_score(&self, score: &NewScore) -> Result<Score>;

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>>;
}
