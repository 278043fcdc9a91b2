#![forbid(unsafe_code)]

mod error;

pub use error::*;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_TCP_PORT: u16 = 9090;
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_CACHE_SIZE_MB: usize = 100;
pub const MAX_CONNECTIONS: usize = 1024;
pub const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024; // 4 KB
pub const MAX_LINE_LENGTH: usize = 64 * 1024; // 64 KB
