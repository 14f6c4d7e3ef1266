//! bandscore-store: Exam store implementations.
//!
//! Implements the `ExamStore` trait over a directory of JSON/TOML documents
//! and in memory, and loads the `bandscore.toml` configuration.

pub mod config;
pub mod fs;
pub mod memory;

pub use bandscore_core::error::StoreError;
pub use config::{create_store, load_config, load_config_from, BandscoreConfig};
pub use fs::FsExamStore;
pub use memory::MemoryExamStore;
