//! Result aggregation modules
//!
//! Combines the pipeline outputs into the final result:
//! - Result types
//! - Metadata and warning flags
//! - Correction confidence summary

pub mod confidence;
pub mod metadata;
pub mod result;
