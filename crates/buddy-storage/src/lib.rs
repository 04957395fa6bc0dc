//! # Buddy Storage
//!
//! Key/value persistence for settings, conversations, tasks, the blacklist
//! and execution bookkeeping.
//!
//! ## Stores
//!
//! - [`MemoryStore`] keeps everything in process memory
//! - [`FileStore`] writes one JSON file per key
//!
//! [`StorageManager`] layers typed operations over either store.

pub mod blacklist;
pub mod error;
pub mod keys;
pub mod manager;
pub mod store;

pub use blacklist::is_domain_blacklisted;
pub use error::StorageError;
pub use manager::StorageManager;
pub use store::{FileStore, KeyValueStore, MemoryStore};
