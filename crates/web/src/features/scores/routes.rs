use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{get_summary, list_events, list_scores, upsert_score};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/", get(list_scores).put(upsert_score))
        .route("/summary", get(get_summary))
}

pub fn event_routes() -> Router<Database> {
    Router::new().route("/", get(list_events))
}
