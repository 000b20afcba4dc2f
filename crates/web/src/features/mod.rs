pub mod participants;
pub mod scores;
