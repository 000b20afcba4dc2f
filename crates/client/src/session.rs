//! Client-side editing of the score grid.
//!
//! Edits show up in the local collection immediately. Each (participant,
//! event, date) triple gets its own debounced write: edits inside the quiet
//! window replace the scheduled value, so only the last one is sent. Writes
//! for one triple go through a per-triple lane and never overtake each other;
//! writes for different triples run independently.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use storage::{
    dto::score::UpsertScoreRequest,
    models::{Event, Score, ScoreKey},
    services::aggregation,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};
use crate::traits::ScoreApi;

/// ID carried by optimistic rows the server has not confirmed yet.
pub const UNSAVED_ID: i32 = 0;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// The latest write for a triple failed; the local value is still shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub key: ScoreKey,
    pub value: i32,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting out the quiet window; may be aborted.
    Debouncing,
    /// Past the window, queued on or holding the lane.
    Writing,
}

struct PendingWrite {
    generation: u64,
    value: i32,
    phase: Phase,
    lane: Arc<tokio::sync::Mutex<()>>,
    task: JoinHandle<()>,
}

struct State {
    event: Event,
    scores: Vec<Score>,
    pending: HashMap<ScoreKey, PendingWrite>,
    failures: HashMap<ScoreKey, WriteFailure>,
    /// Refreshes currently waiting on the API.
    refreshing: usize,
    /// Triples confirmed by a write while a refresh was out; the fetched
    /// snapshot may predate them.
    settled_during_refresh: HashSet<ScoreKey>,
    next_generation: u64,
    closed: bool,
}

impl State {
    /// The pending write for `key`, if it is still the one scheduled as `generation`.
    fn current(&mut self, key: ScoreKey, generation: u64) -> Option<&mut PendingWrite> {
        if self.closed {
            return None;
        }
        self.pending
            .get_mut(&key)
            .filter(|pending| pending.generation == generation)
    }

    fn apply_local(&mut self, key: ScoreKey, value: i32) {
        let now = Utc::now().naive_utc();
        match self.scores.iter_mut().find(|s| s.key() == key) {
            Some(row) => {
                row.score = value;
                row.updated_at = now;
            }
            None => self.scores.push(Score {
                id: UNSAVED_ID,
                participant_id: key.participant_id,
                event: key.event,
                score: value,
                date: key.date,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    fn replace_row(&mut self, row: Score) {
        let key = row.key();
        match self.scores.iter_mut().find(|s| s.key() == key) {
            Some(existing) => *existing = row,
            None => self.scores.push(row),
        }
    }
}

struct Inner<A> {
    api: Arc<A>,
    debounce: Duration,
    state: Mutex<State>,
    idle: Notify,
}

impl<A: ScoreApi + 'static> Inner<A> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn finish(&self, key: ScoreKey, generation: u64, value: i32, result: Result<Score>) {
        let mut state = self.lock();
        if state.closed {
            return;
        }

        let is_latest = state
            .pending
            .get(&key)
            .is_some_and(|pending| pending.generation == generation);

        match result {
            Ok(row) if is_latest => {
                if state.refreshing > 0 {
                    state.settled_during_refresh.insert(key);
                }
                state.replace_row(row);
                state.pending.remove(&key);
                state.failures.remove(&key);
            }
            Ok(row) => {
                tracing::debug!(score_id = row.id, ?key, "discarding superseded write result");
            }
            Err(err) => {
                tracing::warn!(?key, value, error = %err, "score write failed");
                if is_latest {
                    state.pending.remove(&key);
                    state.failures.insert(
                        key,
                        WriteFailure {
                            key,
                            value,
                            message: err.to_string(),
                        },
                    );
                }
            }
        }

        if state.pending.is_empty() {
            self.idle.notify_waiters();
        }
    }
}

/// Marks a refresh as waiting on the API for as long as it is alive, so
/// writes confirmed meanwhile are remembered. Also released when the refresh
/// future is dropped mid-fetch.
struct RefreshInFlight<'a, A: ScoreApi + 'static> {
    inner: &'a Inner<A>,
}

impl<'a, A: ScoreApi + 'static> RefreshInFlight<'a, A> {
    fn start(inner: &'a Inner<A>) -> Result<(Self, HashSet<ScoreKey>)> {
        let mut state = inner.lock();
        if state.closed {
            return Err(ClientError::SessionClosed);
        }
        state.refreshing += 1;
        let pending = state.pending.keys().copied().collect();
        Ok((Self { inner }, pending))
    }
}

impl<A: ScoreApi + 'static> Drop for RefreshInFlight<'_, A> {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.refreshing -= 1;
        if state.refreshing == 0 {
            state.settled_during_refresh.clear();
        }
    }
}

async fn write_after_quiet<A: ScoreApi + 'static>(inner: Arc<Inner<A>>, key: ScoreKey, generation: u64) {
    tokio::time::sleep(inner.debounce).await;

    let (lane, value) = {
        let mut state = inner.lock();
        let Some(pending) = state.current(key, generation) else {
            return;
        };
        pending.phase = Phase::Writing;
        (Arc::clone(&pending.lane), pending.value)
    };

    let _turn = lane.lock().await;

    // A newer edit may have arrived while an earlier write held the lane.
    let still_current = inner.lock().current(key, generation).is_some();
    if !still_current {
        return;
    }

    let request = UpsertScoreRequest::new(key.participant_id, key.event, value, key.date);
    let result = inner.api.upsert_score(&request).await;
    inner.finish(key, generation, value, result);
}

/// Editing state of one open score grid.
///
/// Dropping the session cancels its pending writes.
pub struct ScoreEditSession<A: ScoreApi + 'static> {
    inner: Arc<Inner<A>>,
}

impl<A: ScoreApi + 'static> ScoreEditSession<A> {
    pub fn new(api: Arc<A>, event: Event, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                debounce,
                state: Mutex::new(State {
                    event,
                    scores: Vec::new(),
                    pending: HashMap::new(),
                    failures: HashMap::new(),
                    refreshing: 0,
                    settled_during_refresh: HashSet::new(),
                    next_generation: 0,
                    closed: false,
                }),
                idle: Notify::new(),
            }),
        }
    }

    pub fn event(&self) -> Event {
        self.inner.lock().event
    }

    /// Switch the event that subsequent edits apply to.
    pub fn set_event(&self, event: Event) {
        self.inner.lock().event = event;
    }

    /// Reload scores from the API.
    ///
    /// Rows whose triple had a pending write when the refresh started, or
    /// whose write was confirmed while the fetch was out, keep their local
    /// value; the fetched snapshot may predate them.
    pub async fn refresh(&self) -> Result<()> {
        let (_in_flight, pending_at_start) = RefreshInFlight::start(&self.inner)?;

        let fetched = self.inner.api.list_scores(None).await;

        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let mut keep = pending_at_start;
        keep.extend(state.pending.keys().copied());
        keep.extend(state.settled_during_refresh.iter().copied());

        let fetched = fetched?;
        if state.closed {
            return Err(ClientError::SessionClosed);
        }

        let local: Vec<Score> = state
            .scores
            .iter()
            .filter(|s| keep.contains(&s.key()))
            .cloned()
            .collect();

        let mut scores: Vec<Score> = fetched
            .into_iter()
            .filter(|s| !keep.contains(&s.key()))
            .collect();
        scores.extend(local);

        state.scores = scores;
        state.failures.retain(|key, _| keep.contains(key));
        Ok(())
    }

    /// Record `value` for the current event and schedule its write.
    ///
    /// The local collection changes before this returns. Must be called from
    /// within a Tokio runtime.
    pub fn edit(&self, participant_id: i32, date: NaiveDate, value: i32) -> Result<()> {
        if value < 0 {
            return Err(ClientError::ValidationError(format!(
                "Score must not be negative, got {}",
                value
            )));
        }

        let mut state = self.inner.lock();
        if state.closed {
            return Err(ClientError::SessionClosed);
        }

        let key = ScoreKey {
            participant_id,
            event: state.event,
            date,
        };
        state.apply_local(key, value);
        state.failures.remove(&key);

        state.next_generation += 1;
        let generation = state.next_generation;

        let lane = match state.pending.remove(&key) {
            Some(previous) => {
                if previous.phase == Phase::Debouncing {
                    previous.task.abort();
                    tracing::trace!(?key, "coalesced edit into pending write");
                }
                previous.lane
            }
            None => Arc::default(),
        };

        let task = tokio::spawn(write_after_quiet(Arc::clone(&self.inner), key, generation));
        state.pending.insert(
            key,
            PendingWrite {
                generation,
                value,
                phase: Phase::Debouncing,
                lane,
                task,
            },
        );

        Ok(())
    }

    /// Cancel the participant's pending writes, drop their rows locally and
    /// delete them through the API.
    pub async fn remove_participant(&self, participant_id: i32) -> Result<()> {
        {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(ClientError::SessionClosed);
            }

            state.pending.retain(|key, pending| {
                if key.participant_id == participant_id {
                    pending.task.abort();
                    false
                } else {
                    true
                }
            });
            if state.pending.is_empty() {
                self.inner.idle.notify_waiters();
            }
        }

        self.inner.api.remove_participant(participant_id).await?;

        let mut state = self.inner.lock();
        state.scores.retain(|s| s.participant_id != participant_id);
        state.failures.retain(|key, _| key.participant_id != participant_id);
        Ok(())
    }

    /// Wait until no write is pending.
    pub async fn flush(&self) {
        loop {
            let notified = self.inner.idle.notified();
            let idle = self.inner.lock().pending.is_empty();
            if idle {
                return;
            }
            notified.await;
        }
    }

    /// Tear the session down. Pending writes are cancelled and no result is
    /// applied afterwards.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        if state.closed {
            return;
        }
        state.closed = true;

        let cancelled = state.pending.len();
        for (_, pending) in state.pending.drain() {
            pending.task.abort();
        }
        if cancelled > 0 {
            tracing::debug!(cancelled, "closed session with pending writes");
        }
        self.inner.idle.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Snapshot of the local collection.
    pub fn scores(&self) -> Vec<Score> {
        self.inner.lock().scores.clone()
    }

    /// Run `f` against the local collection without copying it.
    pub fn with_scores<R>(&self, f: impl FnOnce(&[Score]) -> R) -> R {
        f(&self.inner.lock().scores)
    }

    /// Displayed value for the current event.
    pub fn score_for(&self, participant_id: i32, date: NaiveDate) -> Option<i32> {
        let state = self.inner.lock();
        aggregation::score_for(&state.scores, participant_id, date, state.event)
    }

    pub fn pending_writes(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn failures(&self) -> Vec<WriteFailure> {
        let mut failures: Vec<WriteFailure> = self.inner.lock().failures.values().cloned().collect();
        failures.sort_by_key(|f| f.key);
        failures
    }
}

impl<A: ScoreApi + 'static> Drop for ScoreEditSession<A> {
    fn drop(&mut self) {
        self.close();
    }
}
