pub mod comms;
pub mod config;
pub mod domain;
pub mod errors;
pub mod messages;
pub mod security;
pub mod services;
pub mod store;
pub mod utils;

// Crate version exposed for runtime queries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
