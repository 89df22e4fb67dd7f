//! Language-model integration for qualitative ratings.

pub mod openai;
pub mod schema;
