pub mod catalog;
pub mod client;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use catalog::Catalog;
pub use client::{ApiTransport, HttpTransport};
pub use runner::Runner;
pub use utils::config::{Config, RoleCredential};
