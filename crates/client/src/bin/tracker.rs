use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use client::{ApiClient, ScoreApi, ScoreEditSession, grid, session::DEFAULT_DEBOUNCE};
use storage::{
    dto::{participant::CreateParticipantRequest, score::SummaryParams},
    models::Event,
    services::aggregation::DateFilter,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Group fitness score tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "TRACKER_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Quiet window before an edited score is written
    #[arg(long, env = "TRACKER_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    debounce_ms: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage participants
    Participants {
        #[command(subcommand)]
        action: ParticipantAction,
    },
    /// Inspect and edit scores
    Scores {
        #[command(subcommand)]
        action: ScoreAction,
    },
    /// Totals and averages per participant, computed by the server
    Summary {
        #[arg(long)]
        event: Event,

        /// Month to aggregate, as YYYY-MM
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },
    /// Month grid of scores, totals and averages
    Grid {
        #[arg(long)]
        event: Event,

        /// Month to show, as YYYY-MM
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },
    /// List recognized events
    Events,
}

#[derive(Subcommand)]
enum ParticipantAction {
    List,
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },
    Remove {
        id: i32,
    },
}

#[derive(Subcommand)]
enum ScoreAction {
    List {
        #[arg(long)]
        participant: Option<i32>,
    },
    /// Set a score; with several values only the last one is stored
    Set {
        #[arg(long)]
        participant: i32,

        #[arg(long)]
        event: Event,

        #[arg(long)]
        date: NaiveDate,

        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i32>,
    },
}

fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let first_day = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a month in YYYY-MM form", value))?;
    Ok((first_day.year(), first_day.month()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tracker={},client={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api = Arc::new(ApiClient::new(&cli.api_url)?);
    tracing::debug!("Using API at {}", cli.api_url);

    match cli.command {
        Commands::Participants { action } => handle_participants(&api, action).await?,
        Commands::Scores { action } => {
            let debounce = Duration::from_millis(cli.debounce_ms);
            handle_scores(api, action, debounce).await?
        }
        Commands::Summary { event, month } => {
            let params = SummaryParams {
                event: event.to_string(),
                year: month.map(|(year, _)| year),
                month: month.map(|(_, month)| month),
                from: None,
                to: None,
            };
            for row in api.summary(&params).await? {
                let average = row
                    .average
                    .map_or_else(|| "-".to_string(), |avg| format!("{:.1}", avg));
                println!(
                    "{:>4}  {:<24} total {:>6}  avg {:>6}  days {}",
                    row.participant_id, row.name, row.total, average, row.recorded_days
                );
            }
        }
        Commands::Grid { event, month } => {
            let filter = month.map(|(year, month)| DateFilter::Month { year, month });
            let participants = api.list_participants().await?;
            let scores = api.list_scores(None).await?;
            print!("{}", grid::render(&participants, &scores, event, filter.as_ref()));
        }
        Commands::Events => {
            for info in api.list_events().await? {
                println!("{:<12} {}", info.event, info.label);
            }
        }
    }

    Ok(())
}

async fn handle_participants(
    api: &ApiClient,
    action: ParticipantAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ParticipantAction::List => {
            for p in api.list_participants().await? {
                println!("{:>4}  {:<24} {}", p.id, p.name, p.email);
            }
        }
        ParticipantAction::Add { name, email } => {
            let participant = api
                .add_participant(&CreateParticipantRequest::new(name, email))
                .await?;
            tracing::info!("✓ Added participant {} ({})", participant.name, participant.id);
        }
        ParticipantAction::Remove { id } => {
            api.remove_participant(id).await?;
            tracing::info!("✓ Removed participant {} and their scores", id);
        }
    }

    Ok(())
}

async fn handle_scores(
    api: Arc<ApiClient>,
    action: ScoreAction,
    debounce: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScoreAction::List { participant } => {
            for s in api.list_scores(participant).await? {
                println!(
                    "{:>4}  participant {:>4}  {:<12} {}  {:>5}",
                    s.id, s.participant_id, s.event, s.date, s.score
                );
            }
        }
        ScoreAction::Set {
            participant,
            event,
            date,
            values,
        } => {
            let session = ScoreEditSession::new(api, event, debounce);
            for value in values {
                session.edit(participant, date, value)?;
            }
            session.flush().await;

            if let Some(failure) = session.failures().into_iter().next() {
                return Err(failure.message.into());
            }
            if let Some(stored) = session.score_for(participant, date) {
                tracing::info!("✓ {} on {} is now {}", event.label(), date, stored);
            }
        }
    }

    Ok(())
}
