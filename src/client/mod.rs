//! Euphrosyne API clients
//!
//! Split by responsibility, each behind a focused trait:
//! - [`SessionClient`] - authentication and the bearer-token request protocol
//! - [`CatalogApi`] - project/run listing
//! - [`ToolsApi`] - remote folder initialization and upload credentials

pub mod catalog;
pub mod models;
pub mod session;
pub mod tools;

pub use catalog::{CatalogApi, CatalogClient};
pub use models::{DataType, ObjectSummary, Project, Run, UploadCredential};
pub use session::{SessionClient, is_token_expired, token_expiry};
pub use tools::{ToolsApi, ToolsClient};
