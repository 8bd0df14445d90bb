//! Core library surface for the Biblia Reader TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` targets as well as potential external tooling can reuse the same
//! pieces: provisioning, the two database accessors, the sanitizer, and the
//! interactive front-end.
pub mod assets;
pub mod db;
pub mod models;
pub mod sanitize;
pub mod ui;

/// Convenience re-exports for the persistence layer. These are what `main.rs`
/// touches to bring the data directory and the user store up.
pub use assets::{default_bundle_dir, provision};
pub use db::{data_dir, user_db_path, ScriptureLibrary, StoreError, StoreResult, UserStore};

/// The sanitizer pair applied to everything the reader sees.
pub use sanitize::{clean_note, clean_verse};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
