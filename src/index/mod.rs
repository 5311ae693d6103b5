pub mod backend;
pub mod build;
pub mod filter;
pub mod lock;
pub mod merge;
pub mod reader;
pub mod roots;
pub mod stats;
pub mod types;
pub mod walk;
pub mod writer;

pub use backend::{IndexBackend, ShardBuilder, TrigramStore};
pub use build::{IndexPipeline, Outcome};
pub use filter::{Admission, AdmissionFilter, ExtensionAllowList, Scope};
pub use reader::IndexReader;
pub use types::*;
pub use writer::IndexWriter;
