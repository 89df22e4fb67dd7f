//! Storage implementations for the pipeline's checkpoint artifacts.

pub mod files;

pub use files::FileStore;
