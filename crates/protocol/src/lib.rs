#![forbid(unsafe_code)]

mod line;
mod params;
mod query;

pub use line::LineDecoder;
pub use params::QueryParams;
pub use query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QueryOptions, SortField, SortOrder};
