// Public modules
pub mod chat;
pub mod client;
pub mod credentials;
pub mod error;
pub mod observability;
pub mod render;
pub mod sessions;
pub mod types;

// Re-exports
pub use client::{DialogflowCx, endpoint_for_location};
pub use credentials::{Credentials, TokenSource};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use sessions::SessionsClient;
pub use types::*;
