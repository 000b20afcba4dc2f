mod event;
mod participant;
mod score;

pub use event::{Event, ParseEventError};
pub use participant::Participant;
pub use score::{NewScore, Score, ScoreKey};
