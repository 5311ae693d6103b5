//! Shared helpers for the index builder.
//!
//! - [`app_data`] - configuration file and index file location
//! - [`encoding`] - varints and length-prefixed fields of the index format
//! - [`progress`] - optional walk spinner
//! - [`trigram`] - trigram extraction and content checks

pub mod app_data;
pub mod encoding;
pub mod progress;
pub mod trigram;

pub use encoding::*;
pub use trigram::*;
