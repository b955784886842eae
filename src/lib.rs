//! Regex-driven source analysis that synthesizes Markdown documentation.
//!
//! The pipeline runs scan → analyze → aggregate → detect architecture →
//! synthesize → render → report; [`core::Engine`] drives one run.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use config::Config;
pub use error::{DocsynthError, Result};
