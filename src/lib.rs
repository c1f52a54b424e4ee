pub mod app;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod health;
pub mod models;
pub mod upload;

pub use app::ExtractorApp;
pub use backend::{ExtractionBackend, HttpBackend};
pub use config::ClientConfig;
pub use error::ClientError;
