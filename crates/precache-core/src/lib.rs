pub mod config;
pub mod logging;

// Fetch-verify-cache pipeline
pub mod cache;
pub mod checksum;
pub mod error;
pub mod fetch_head;
pub mod fetcher;
pub mod http;
pub mod package;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod rewrite;

pub use error::PrecacheError;
