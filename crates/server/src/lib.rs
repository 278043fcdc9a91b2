#![forbid(unsafe_code)]

pub mod api;
mod assets;
pub mod config;
mod connection;
pub mod handler;
mod listener;
mod status;

pub use api::{AppState, build_router};
pub use config::{CapacityConfig, Config};
pub use connection::Connection;
pub use handler::handle_connection;
pub use listener::IngestServer;
