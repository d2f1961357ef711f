//! Client for the construction defect-control API: role and status policy,
//! report aggregation, session handling and typed REST wrappers.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod models;
pub mod policy;
pub mod sequence;
pub mod session;
pub mod utils;
pub mod workflow;

pub use api::ApiClient;
pub use config::AppConfig;
pub use session::{FileSessionStore, MemorySessionStore, Session};
pub use utils::errors::{ClientError, ClientResult};
