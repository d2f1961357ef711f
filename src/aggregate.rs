//! Summary statistics over an in-memory page of defects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::report::DefectsReport;
use crate::models::{Defect, DefectPriority, DefectStatus};

/// Count per status. All five statuses are present, zero included.
pub fn count_by_status(defects: &[Defect]) -> BTreeMap<DefectStatus, u64> {
    let mut counts: BTreeMap<DefectStatus, u64> =
        DefectStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    for defect in defects {
        *counts.entry(defect.status).or_insert(0) += 1;
    }
    counts
}

/// Count per priority. All four priorities are present, zero included.
pub fn count_by_priority(defects: &[Defect]) -> BTreeMap<DefectPriority, u64> {
    let mut counts: BTreeMap<DefectPriority, u64> =
        DefectPriority::ALL.into_iter().map(|p| (p, 0)).collect();
    for defect in defects {
        *counts.entry(defect.priority).or_insert(0) += 1;
    }
    counts
}

pub fn count_overdue(defects: &[Defect], now: DateTime<Utc>) -> u64 {
    defects.iter().filter(|d| d.is_overdue(now)).count() as u64
}

/// Share of closed defects in percent; 0 for an empty list.
pub fn completion_percentage(defects: &[Defect]) -> f64 {
    if defects.is_empty() {
        return 0.0;
    }
    let closed = defects
        .iter()
        .filter(|d| d.status == DefectStatus::Closed)
        .count();
    closed as f64 / defects.len() as f64 * 100.0
}

/// Mean hours from creation to last update over closed defects that carry an
/// `updated_at`.
pub fn average_resolution_hours(defects: &[Defect]) -> Option<f64> {
    let durations: Vec<f64> = defects
        .iter()
        .filter(|d| d.status == DefectStatus::Closed)
        .filter_map(|d| d.updated_at.map(|updated| updated - d.created_at))
        .map(|elapsed| elapsed.num_seconds() as f64 / 3600.0)
        .collect();

    if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectSummary {
    pub total: u64,
    pub by_status: BTreeMap<DefectStatus, u64>,
    pub by_priority: BTreeMap<DefectPriority, u64>,
    pub overdue: u64,
    pub completion_percentage: f64,
    pub average_resolution_hours: Option<f64>,
}

pub fn summarize(defects: &[Defect], now: DateTime<Utc>) -> DefectSummary {
    DefectSummary {
        total: defects.len() as u64,
        by_status: count_by_status(defects),
        by_priority: count_by_priority(defects),
        overdue: count_overdue(defects, now),
        completion_percentage: completion_percentage(defects),
        average_resolution_hours: average_resolution_hours(defects),
    }
}

impl DefectSummary {
    /// Normalise a server report into the same shape as a local summary.
    /// Unrecognised status or priority names are logged and skipped.
    pub fn from_report(report: &DefectsReport) -> Self {
        let mut by_status: BTreeMap<DefectStatus, u64> =
            DefectStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for entry in &report.defects_by_status {
            match entry.status.parse::<DefectStatus>() {
                Ok(status) => *by_status.entry(status).or_insert(0) += entry.count,
                Err(e) => log::warn!("Skipping report row: {}", e),
            }
        }

        let mut by_priority: BTreeMap<DefectPriority, u64> =
            DefectPriority::ALL.into_iter().map(|p| (p, 0)).collect();
        for entry in &report.defects_by_priority {
            match entry.priority.parse::<DefectPriority>() {
                Ok(priority) => *by_priority.entry(priority).or_insert(0) += entry.count,
                Err(e) => log::warn!("Skipping report row: {}", e),
            }
        }

        let closed = by_status[&DefectStatus::Closed];
        let completion_percentage = if report.total_defects == 0 {
            0.0
        } else {
            closed as f64 / report.total_defects as f64 * 100.0
        };

        DefectSummary {
            total: report.total_defects,
            by_status,
            by_priority,
            overdue: report.overdue_defects,
            completion_percentage,
            average_resolution_hours: (closed > 0).then_some(report.avg_resolution_time),
        }
    }

    pub fn open(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(status, _)| !status.is_terminal())
            .map(|(_, count)| count)
            .sum()
    }
}
