use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::StorageError;

/// Exercise kinds a score can be recorded for.
///
/// Mirrors the Postgres enum type `event`; adding a variant needs a migration
/// extending that type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "event")]
pub enum Event {
    #[serde(rename = "pushup_60s")]
    #[sqlx(rename = "pushup_60s")]
    Pushup60s,
    #[serde(rename = "pullup_max")]
    #[sqlx(rename = "pullup_max")]
    PullupMax,
}

impl Event {
    pub const ALL: [Event; 2] = [Event::Pushup60s, Event::PullupMax];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Pushup60s => "pushup_60s",
            Event::PullupMax => "pullup_max",
        }
    }

    /// Human readable name shown in grid headers.
    pub fn label(&self) -> &'static str {
        match self {
            Event::Pushup60s => "Push-ups (60s)",
            Event::PullupMax => "Pull-ups (Max)",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event '{0}'")]
pub struct ParseEventError(pub String);

impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Event::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| ParseEventError(s.to_string()))
    }
}

impl From<ParseEventError> for StorageError {
    fn from(error: ParseEventError) -> Self {
        StorageError::invalid_field("event", "unknown_event", error.to_string())
    }
}
