use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::api::{null_as_empty, Pagination};
use crate::models::auth::User;
use crate::models::project::Project;

/// Lifecycle state of a defect. Variant order follows the status chain,
/// with `Cancelled` as the side exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectStatus {
    New,
    InProgress,
    OnReview,
    Closed,
    Cancelled,
}

impl DefectStatus {
    pub const ALL: [DefectStatus; 5] = [
        DefectStatus::New,
        DefectStatus::InProgress,
        DefectStatus::OnReview,
        DefectStatus::Closed,
        DefectStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectStatus::New => "new",
            DefectStatus::InProgress => "in_progress",
            DefectStatus::OnReview => "on_review",
            DefectStatus::Closed => "closed",
            DefectStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DefectStatus::Closed | DefectStatus::Cancelled)
    }

    /// Successor on the status chain, if any.
    pub fn next(&self) -> Option<DefectStatus> {
        crate::policy::transitions::next_status(*self)
    }
}

impl fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DefectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DefectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid defect status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl DefectPriority {
    pub const ALL: [DefectPriority; 4] = [
        DefectPriority::Low,
        DefectPriority::Medium,
        DefectPriority::High,
        DefectPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectPriority::Low => "low",
            DefectPriority::Medium => "medium",
            DefectPriority::High => "high",
            DefectPriority::Critical => "critical",
        }
    }
}

impl fmt::Display for DefectPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DefectPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DefectPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| format!("Invalid defect priority '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: DefectStatus,
    pub priority: DefectPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub project_id: i64,
    pub author_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
}

impl Defect {
    /// Past its deadline while still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline < now && !self.status.is_terminal(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectData {
    pub defect: Defect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub defects: Vec<Defect>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectHistoryEntry {
    pub id: i64,
    pub defect_id: i64,
    pub field: String,
    #[serde(default)]
    pub old_value: String,
    #[serde(default)]
    pub new_value: String,
    pub changed_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectHistory {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<DefectHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDefectRequest {
    pub title: String,
    pub description: String,
    pub priority: DefectPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDefectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DefectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<DefectPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DefectStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters accepted by the defect list, report and export endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DefectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<DefectPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
