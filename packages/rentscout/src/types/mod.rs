//! Data types shared across pipeline stages.

pub mod listing;
pub mod rating;
