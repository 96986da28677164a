pub mod api;
pub mod commentary;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod explain;
pub mod index;
pub mod logging;
pub mod models;
pub mod search;
pub mod store;

pub use config::AppConfig;
pub use errors::*;
