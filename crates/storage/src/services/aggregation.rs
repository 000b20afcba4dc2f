//! Read-only aggregates over an already fetched score collection.
//!
//! Every function is a single pass over `scores` and never mutates it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dto::score::ParticipantSummary;
use crate::models::{Event, Participant, Score};

/// Which dates take part in an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    All,
    /// Inclusive on both ends
    Range { from: NaiveDate, to: NaiveDate },
    Month { year: i32, month: u32 },
}

impl DateFilter {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateFilter::All => true,
            DateFilter::Range { from, to } => from <= date && date <= to,
            DateFilter::Month { year, month } => date.year() == year && date.month() == month,
        }
    }
}

fn matching<'a>(
    scores: &'a [Score],
    participant_id: i32,
    event: Event,
    filter: Option<&'a DateFilter>,
) -> impl Iterator<Item = &'a Score> + 'a {
    scores.iter().filter(move |s| {
        s.participant_id == participant_id
            && s.event == event
            && filter.is_none_or(|f| f.contains(s.date))
    })
}

/// Stored value for the exact triple. `None` means no row, which is not the
/// same as a recorded zero.
pub fn score_for(scores: &[Score], participant_id: i32, date: NaiveDate, event: Event) -> Option<i32> {
    scores
        .iter()
        .find(|s| s.participant_id == participant_id && s.date == date && s.event == event)
        .map(|s| s.score)
}

pub fn total_for(
    scores: &[Score],
    participant_id: i32,
    event: Event,
    filter: Option<&DateFilter>,
) -> i64 {
    matching(scores, participant_id, event, filter)
        .map(|s| i64::from(s.score))
        .sum()
}

/// Mean over rows with a score above zero; `None` when there are none.
pub fn average_for(
    scores: &[Score],
    participant_id: i32,
    event: Event,
    filter: Option<&DateFilter>,
) -> Option<f64> {
    let (sum, count) = matching(scores, participant_id, event, filter)
        .filter(|s| s.score > 0)
        .fold((0i64, 0u32), |(sum, count), s| {
            (sum + i64::from(s.score), count + 1)
        });

    (count > 0).then(|| sum as f64 / f64::from(count))
}

/// Sorted distinct dates holding at least one score for `event`.
pub fn recorded_dates(scores: &[Score], event: Event, filter: Option<&DateFilter>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = scores
        .iter()
        .filter(|s| s.event == event && filter.is_none_or(|f| f.contains(s.date)))
        .map(|s| s.date)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// One summary row per participant, in the order given.
pub fn summarize(
    participants: &[Participant],
    scores: &[Score],
    event: Event,
    filter: Option<&DateFilter>,
) -> Vec<ParticipantSummary> {
    participants
        .iter()
        .map(|p| ParticipantSummary {
            participant_id: p.id,
            name: p.name.clone(),
            total: total_for(scores, p.id, event, filter),
            average: average_for(scores, p.id, event, filter),
            recorded_days: matching(scores, p.id, event, filter).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn score(participant_id: i32, event: Event, day: NaiveDate, value: i32) -> Score {
        Score {
            id: 0,
            participant_id,
            event,
            score: value,
            date: day,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    fn participant(id: i32, name: &str) -> Participant {
        Participant {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_totals_over_empty_or_foreign_scores_are_zero() {
        assert_eq!(total_for(&[], 1, Event::Pushup60s, None), 0);

        let others = vec![
            score(2, Event::Pushup60s, date(1, 1), 40),
            score(3, Event::Pushup60s, date(1, 2), 25),
        ];
        assert_eq!(total_for(&others, 1, Event::Pushup60s, None), 0);
        assert_eq!(average_for(&others, 1, Event::Pushup60s, None), None);
    }

    #[test]
    fn test_average_skips_zero_scores() {
        let scores = vec![
            score(1, Event::PullupMax, date(1, 1), 0),
            score(1, Event::PullupMax, date(1, 2), 10),
            score(1, Event::PullupMax, date(1, 3), 20),
        ];

        assert_eq!(total_for(&scores, 1, Event::PullupMax, None), 30);
        assert_eq!(average_for(&scores, 1, Event::PullupMax, None), Some(15.0));
    }

    #[test]
    fn test_average_of_only_zeros_is_absent() {
        let scores = vec![score(1, Event::PullupMax, date(1, 1), 0)];
        assert_eq!(average_for(&scores, 1, Event::PullupMax, None), None);
    }

    #[test]
    fn test_score_for_distinguishes_absent_from_zero() {
        let scores = vec![
            score(1, Event::Pushup60s, date(1, 1), 30),
            score(1, Event::Pushup60s, date(1, 2), 0),
        ];

        assert_eq!(score_for(&scores, 1, date(1, 2), Event::Pushup60s), Some(0));
        assert_eq!(score_for(&scores, 1, date(1, 3), Event::Pushup60s), None);
        assert_eq!(score_for(&scores, 1, date(1, 1), Event::PullupMax), None);
    }

    #[test]
    fn test_ann_pushups_scenario() {
        let scores = vec![
            score(1, Event::Pushup60s, date(1, 1), 30),
            score(1, Event::Pushup60s, date(1, 2), 0),
        ];

        assert_eq!(total_for(&scores, 1, Event::Pushup60s, None), 30);
        assert_eq!(average_for(&scores, 1, Event::Pushup60s, None), Some(30.0));
    }

    #[test]
    fn test_month_filter_excludes_other_months() {
        let scores = vec![
            score(1, Event::Pushup60s, date(1, 31), 10),
            score(1, Event::Pushup60s, date(2, 1), 20),
            score(1, Event::Pushup60s, date(2, 29), 5),
        ];
        let february = DateFilter::Month {
            year: 2024,
            month: 2,
        };

        assert_eq!(total_for(&scores, 1, Event::Pushup60s, Some(&february)), 25);
        assert_eq!(
            average_for(&scores, 1, Event::Pushup60s, Some(&february)),
            Some(12.5)
        );
        assert_eq!(
            recorded_dates(&scores, Event::Pushup60s, Some(&february)),
            vec![date(2, 1), date(2, 29)]
        );
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let range = DateFilter::Range {
            from: date(3, 1),
            to: date(3, 10),
        };
        assert!(range.contains(date(3, 1)));
        assert!(range.contains(date(3, 10)));
        assert!(!range.contains(date(3, 11)));
        assert!(DateFilter::All.contains(date(12, 31)));
    }

    #[test]
    fn test_recorded_dates_are_sorted_and_distinct() {
        let scores = vec![
            score(2, Event::Pushup60s, date(1, 3), 1),
            score(1, Event::Pushup60s, date(1, 1), 1),
            score(1, Event::Pushup60s, date(1, 3), 1),
            score(1, Event::PullupMax, date(1, 2), 1),
        ];

        assert_eq!(
            recorded_dates(&scores, Event::Pushup60s, None),
            vec![date(1, 1), date(1, 3)]
        );
    }

    #[test]
    fn test_summarize_keeps_participant_order() {
        let participants = vec![participant(2, "Bob"), participant(1, "Ann")];
        let scores = vec![
            score(1, Event::Pushup60s, date(1, 1), 30),
            score(1, Event::Pushup60s, date(1, 2), 0),
            score(2, Event::PullupMax, date(1, 1), 9),
        ];

        let summary = summarize(&participants, &scores, Event::Pushup60s, None);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].name, "Bob");
        assert_eq!(summary[0].total, 0);
        assert_eq!(summary[0].average, None);
        assert_eq!(summary[0].recorded_days, 0);
        assert_eq!(summary[1].total, 30);
        assert_eq!(summary[1].average, Some(30.0));
        assert_eq!(summary[1].recorded_days, 2);
    }
}
