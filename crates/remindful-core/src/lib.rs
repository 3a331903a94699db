//! remindful-core — Session controller, matching, and scoring.
//!
//! This crate defines the vocabulary model, the phase state machine, and the
//! scoring logic that the rest of remindful builds on.

pub mod error;
pub mod immediate;
pub mod interference;
pub mod learning;
pub mod matcher;
pub mod parser;
pub mod recall;
pub mod report;
pub mod scoring;
pub mod session;
pub mod traits;
pub mod vocabulary;
