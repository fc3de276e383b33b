//! Data types for the analysis pipeline.

pub mod document;
pub mod lot;
pub mod record;
