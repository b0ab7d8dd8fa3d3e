pub mod continuity;
pub mod creation;
