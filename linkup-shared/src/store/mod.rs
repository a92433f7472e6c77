//! File-backed record store
//!
//! The whole data set lives in one JSON document with one array per
//! collection. The identity backend owns two of them (`users` and
//! `pendingEmailChanges`); every other top-level key belongs to the frontend
//! fixtures and is written back untouched.
//!
//! # Modules
//!
//! - [`document`]: The in-memory shape of the JSON document
//! - [`json_file`]: Loading, transactional mutation and persistence
//!
//! # Example
//!
//! ```no_run
//! use linkup_shared::store::JsonStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonStore::open("db.json").await?;
//! let users = store.read(|doc| doc.users.len()).await?;
//! println!("{} users loaded", users);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod json_file;

pub use document::StoreDocument;
pub use json_file::{JsonStore, StoreError};
