pub mod attachments;
pub mod auth;
pub mod client;
pub mod comments;
pub mod defects;
pub mod details;
pub mod projects;
pub mod reports;
pub mod users;

pub use client::ApiClient;
pub use details::DefectDetails;
pub use reports::ReportLoader;
