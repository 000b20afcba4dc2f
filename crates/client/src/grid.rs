//! Plain-text rendering of the month grid: one row per participant, one
//! column per date with a recorded score, then total and average.

use storage::{
    models::{Event, Participant, Score},
    services::aggregation::{self, DateFilter},
};

const PLACEHOLDER: &str = "-";

pub fn render(
    participants: &[Participant],
    scores: &[Score],
    event: Event,
    filter: Option<&DateFilter>,
) -> String {
    let dates = aggregation::recorded_dates(scores, event, filter);

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(participants.len() + 1);

    let mut header = vec!["Name".to_string()];
    header.extend(dates.iter().map(|d| d.format("%m-%d").to_string()));
    header.push("Total".to_string());
    header.push("Avg".to_string());
    rows.push(header);

    for participant in participants {
        let mut row = vec![participant.name.clone()];
        row.extend(dates.iter().map(|date| {
            aggregation::score_for(scores, participant.id, *date, event)
                .map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
        }));
        row.push(aggregation::total_for(scores, participant.id, event, filter).to_string());
        row.push(
            aggregation::average_for(scores, participant.id, event, filter)
                .map_or_else(|| PLACEHOLDER.to_string(), |avg| format!("{:.1}", avg)),
        );
        rows.push(row);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = format!("{}\n", event.label());
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if col == 0 {
                    format!("{:<width$}", cell, width = widths[col])
                } else {
                    format!("{:>width$}", cell, width = widths[col])
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    if participants.is_empty() {
        out.push_str("No participants yet.\n");
    }

    out
}
