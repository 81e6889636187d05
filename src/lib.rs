//! # snip_core
//!
//! The engine behind a personal snippet manager: persisted snippet records,
//! fuzzy search over them, and `{{variable}}` templates inside their content.
//! Windows, hotkeys and the clipboard belong to the application built on top.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snip_core::config::EngineConfig;
//! use snip_core::store::SnippetStore;
//! use snip_core::{search, variables};
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), snip_core::SnipError> {
//! let config = EngineConfig::load(&EngineConfig::default_path().unwrap());
//! let store = SnippetStore::from_config(&config)?;
//!
//! let snapshot = store.snapshot();
//! let hits = search::search("flask", &snapshot, &config.search_options());
//!
//! if let Some(hit) = hits.first() {
//!     let values = HashMap::from([("port".to_string(), "8000".to_string())]);
//!     let text = variables::substitute(&hit.snippet.content, &values)?;
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`store`]**: loads, validates and saves the YAML snippet file, keeps
//!   rotating backups and reloads when the file changes on disk
//! - **[`watcher`]**: debounced file change notification used by the store
//! - **[`search`]**: weighted fuzzy ranking and tag suggestions
//! - **[`variables`]**: placeholder detection and substitution
//! - **[`config`]**: engine settings
//! - **[`usage`]**: per-snippet usage counts
//! - **[`error`]**: the crate-wide error type
//!
//! ## Error Handling
//!
//! Each module has its own error enum. All of them convert into
//! [`SnipError`], so `?` works across modules in application code.
//!
//! Parse and validation problems in the snippet file are logged and never
//! block use of the snippets already loaded. Failed saves and unresolved
//! variables are returned to the caller.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.

pub mod config;
pub mod domain;
pub mod error;
pub mod search;
pub mod store;
pub mod usage;
pub mod variables;
pub mod watcher;

/// Re-exports the most commonly used types for convenience.
pub use domain::Snippet;
pub use error::{SnipError, SnipResult};
pub use store::{Snapshot, SnippetStore, StoreError};
