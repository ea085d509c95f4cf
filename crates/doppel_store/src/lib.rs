pub mod catalog;
pub mod store;

pub use catalog::Catalog;
pub use store::SqliteStore;
