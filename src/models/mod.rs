pub mod api;
pub mod attachment;
pub mod auth;
pub mod comment;
pub mod defect;
pub mod project;
pub mod report;

pub use api::{ApiResponse, Pagination};
pub use attachment::Attachment;
pub use auth::{Role, User};
pub use comment::Comment;
pub use defect::{Defect, DefectFilters, DefectPriority, DefectStatus};
pub use project::Project;
