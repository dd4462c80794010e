pub mod pool;
pub mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore};
