use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use super::{RemovedRows, ScoreStore};
use crate::error::{Result, StorageError};
use crate::models::{NewScore, Participant, Score, ScoreKey};

/// In-process store with the same constraints as the Postgres schema.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    participants: BTreeMap<i32, Participant>,
    scores: BTreeMap<i32, Score>,
    score_index: HashMap<ScoreKey, i32>,
    last_participant_id: i32,
    last_score_id: i32,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means a panicking test; the tables are still consistent.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn insert_participant(&self, name: &str, email: &str) -> Result<Participant> {
        let mut tables = self.tables();

        if tables.participants.values().any(|p| p.email == email) {
            return Err(StorageError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        tables.last_participant_id += 1;
        let timestamp = now();
        let participant = Participant {
            id: tables.last_participant_id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables
            .participants
            .insert(participant.id, participant.clone());

        Ok(participant)
    }

    async fn find_participant(&self, id: i32) -> Result<Option<Participant>> {
        Ok(self.tables().participants.get(&id).cloned())
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.tables().participants.values().cloned().collect())
    }

    async fn delete_participant(&self, id: i32) -> Result<RemovedRows> {
        let mut tables = self.tables();

        let before = tables.scores.len();
        tables.scores.retain(|_, s| s.participant_id != id);
        tables.score_index.retain(|key, _| key.participant_id != id);
        let scores = (before - tables.scores.len()) as u64;

        let participants = u64::from(tables.participants.remove(&id).is_some());

        Ok(RemovedRows {
            participants,
            scores,
        })
    }

    async fn upsert_score(&self, score: &NewScore) -> Result<Score> {
        let mut tables = self.tables();

        if !tables.participants.contains_key(&score.key.participant_id) {
            return Err(StorageError::NotFound(format!(
                "Participant {} does not exist",
                score.key.participant_id
            )));
        }

        let timestamp = now();
        if let Some(id) = tables.score_index.get(&score.key).copied() {
            if let Some(existing) = tables.scores.get_mut(&id) {
                existing.score = score.score;
                existing.updated_at = timestamp;
                return Ok(existing.clone());
            }
        }

        tables.last_score_id += 1;
        let row = Score {
            id: tables.last_score_id,
            participant_id: score.key.participant_id,
            event: score.key.event,
            score: score.score,
            date: score.key.date,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.score_index.insert(score.key, row.id);
        tables.scores.insert(row.id, row.clone());

        Ok(row)
    }

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>> {
        let tables = self.tables();
        let scores = tables
            .scores
            .values()
            .filter(|s| participant_id.is_none_or(|id| s.participant_id == id))
            .cloned()
            .collect();

        Ok(scores)
    }
}
