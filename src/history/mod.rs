//! Persistent per-identity conversation history

pub mod store;

pub use store::{HistoryStore, SqliteHistoryStore};
