use serde::{Deserialize, Serialize};

use crate::models::api::null_as_empty;
use crate::models::defect::Defect;
use crate::models::project::Project;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: u64,
}

/// Server-computed aggregate over all defects matching the filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectsReport {
    pub total_defects: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub defects_by_status: Vec<StatusCount>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub defects_by_priority: Vec<PriorityCount>,
    #[serde(default)]
    pub overdue_defects: u64,
    /// Hours, averaged over closed defects.
    #[serde(default)]
    pub avg_resolution_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project: Project,
    pub total_defects: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub defects_by_status: Vec<StatusCount>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recent_defects: Vec<Defect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData<T> {
    pub report: T,
}
