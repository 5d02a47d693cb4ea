// src/lib.rs

pub mod api;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod session;
pub mod utils;

// Re-export specific items for convenience if needed
pub use api::ApiClient;
pub use error::ClientError;
pub use session::Session;
