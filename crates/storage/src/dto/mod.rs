pub mod participant;
pub mod score;
