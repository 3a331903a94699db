//! remindful-sources — Front ends and administration plumbing.
//!
//! Implements the prompt sink and response source traits over a real
//! console and over scripted reply files, and carries the configuration
//! and administration-history layers the CLI builds on.

pub mod config;
pub mod console;
pub mod history;
pub mod scripted;
