use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub id: i32,
    pub participant_id: i32,
    pub event: Event,
    pub score: i32,
    pub date: NaiveDate,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl Score {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            participant_id: self.participant_id,
            event: self.event,
            date: self.date,
        }
    }
}

/// The (participant, event, date) triple identifying at most one score row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub participant_id: i32,
    pub event: Event,
    pub date: NaiveDate,
}

/// A validated score write, ready for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewScore {
    pub key: ScoreKey,
    pub score: i32,
}
