use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{Result, StorageError};
use crate::models::Event;
use crate::services::aggregation::DateFilter;

/// Request payload for recording a score; overwrites any value already
/// stored for the same participant, event and date.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertScoreRequest {
    pub participant_id: i32,

    #[validate(custom(function = "validate_event"))]
    #[schema(example = "pushup_60s")]
    pub event: String,

    #[validate(range(min = 0, message = "Score must not be negative"))]
    pub score: i32,

    pub date: NaiveDate,
}

impl UpsertScoreRequest {
    pub fn new(participant_id: i32, event: Event, score: i32, date: NaiveDate) -> Self {
        Self {
            participant_id,
            event: event.as_str().to_string(),
            score,
            date,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListScoresParams {
    /// Only return scores of this participant
    pub participant_id: Option<i32>,
}

/// Query for per-participant totals. `year` + `month` select a calendar
/// month, `from`/`to` an inclusive range; neither means all dates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    #[validate(custom(function = "validate_event"))]
    pub event: String,

    pub year: Option<i32>,

    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: Option<u32>,

    pub from: Option<NaiveDate>,

    pub to: Option<NaiveDate>,
}

impl SummaryParams {
    pub fn date_filter(&self) -> Result<DateFilter> {
        match (self.year, self.month, self.from, self.to) {
            (Some(year), Some(month), None, None) => Ok(DateFilter::Month { year, month }),
            (None, None, None, None) => Ok(DateFilter::All),
            (None, None, from, to) => Ok(DateFilter::Range {
                from: from.unwrap_or(NaiveDate::MIN),
                to: to.unwrap_or(NaiveDate::MAX),
            }),
            _ => Err(StorageError::invalid_field(
                "month",
                "ambiguous_date_filter",
                "Use either year and month together, or from/to".to_string(),
            )),
        }
    }
}

/// Aggregated scores of one participant for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantSummary {
    pub participant_id: i32,
    pub name: String,
    pub total: i64,
    /// Mean over non-zero scores; absent when there are none
    pub average: Option<f64>,
    pub recorded_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventInfo {
    pub event: Event,
    pub label: String,
}

impl From<Event> for EventInfo {
    fn from(event: Event) -> Self {
        Self {
            event,
            label: event.label().to_string(),
        }
    }
}

fn validate_event(event: &str) -> std::result::Result<(), validator::ValidationError> {
    if event.parse::<Event>().is_ok() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_event"))
    }
}
