#![forbid(unsafe_code)]

mod capacity;
mod entry;
pub mod query;
mod store;

pub use capacity::{Capacity, ENTRY_OVERHEAD, Usage};
pub use entry::Entry;
pub use query::QueryResult;
pub use store::LogStore;
