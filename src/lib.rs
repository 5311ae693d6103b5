//! # csindex - incremental trigram index builder
//!
//! Walks source trees, admits the files worth searching, and publishes an
//! updated index file without ever exposing a half-written one.
//!
//! ## Architecture
//!
//! - [`index::filter`] - which files and directories are admitted
//! - [`index::roots`] - canonical, sorted root paths
//! - [`index::walk`] - pruned depth-first traversal
//! - [`index::build`] - build, merge and publish under an exclusive lock
//! - [`index::backend`] - the store interface, with the trigram store
//!   ([`index::writer`], [`index::reader`], [`index::merge`])
//! - [`utils`] - configuration, encoding and trigram helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use csindex::index::{IndexPipeline, TrigramStore};
//! use csindex::utils::app_data::IndexerConfig;
//! use std::path::Path;
//!
//! let config = IndexerConfig::default();
//! let store = TrigramStore::new(config.max_file_size);
//! IndexPipeline::new(&store, &config)
//!     .run(Path::new(".csearchindex"), &["src"])
//!     .unwrap();
//! ```

pub mod index;
pub mod logging;
pub mod utils;
