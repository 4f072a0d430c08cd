pub mod migrations;
pub mod seed;
pub mod sqlite;
pub mod store;

pub use sqlite::SqliteStore;
pub use store::{Collection, Filter, Record, RecordStore};
