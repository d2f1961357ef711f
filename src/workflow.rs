//! Operations guarded by the access policy and the transition table.
//!
//! Each operation checks permissions against the session's current user
//! before any request is sent; a denial never reaches the network.

use chrono::Utc;

use crate::aggregate::{summarize, DefectSummary};
use crate::api::ApiClient;
use crate::models::defect::UpdateDefectRequest;
use crate::models::project::{CreateProjectRequest, UpdateProjectRequest};
use crate::models::{Defect, DefectFilters, DefectStatus, Project, User};
use crate::policy::access::{
    advance_target, can_cancel_defect, can_delete_defect, can_edit_defect, can_export_reports,
    can_manage_projects, can_set_status, can_view_reports,
};
use crate::policy::transitions::check_transition;
use crate::utils::errors::{ClientError, ClientResult};
use crate::utils::validation::DefectEditForm;

pub struct DefectWorkflow<'a> {
    client: &'a ApiClient,
}

impl<'a> DefectWorkflow<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn actor(&self) -> ClientResult<User> {
        self.client
            .session()
            .user()
            .ok_or_else(|| ClientError::Unauthorized("Authentication required".to_string()))
    }

    fn deny(&self, actor: &User, action: &str, defect_id: i64) -> ClientError {
        log::warn!(
            "User {} ({}) may not {} defect {}",
            actor.id,
            actor.role(),
            action,
            defect_id
        );
        ClientError::Forbidden(format!("You are not allowed to {} this defect", action))
    }

    /// Move the defect one step along the status chain.
    pub async fn advance(&self, defect: &Defect) -> ClientResult<Defect> {
        let actor = self.actor()?;
        if defect.status.is_terminal() {
            return Err(ClientError::Validation(format!(
                "Defect is already {}",
                defect.status
            )));
        }
        let next = advance_target(Some(&actor), defect)
            .ok_or_else(|| self.deny(&actor, "advance", defect.id))?;
        self.client.update_defect_status(defect.id, next).await
    }

    pub async fn change_status(&self, defect: &Defect, to: DefectStatus) -> ClientResult<Defect> {
        let actor = self.actor()?;
        check_transition(defect.status, to)
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        if !can_set_status(Some(&actor), defect, to) {
            return Err(self.deny(&actor, "change the status of", defect.id));
        }
        self.client.update_defect_status(defect.id, to).await
    }

    pub async fn cancel(&self, defect: &Defect) -> ClientResult<Defect> {
        let actor = self.actor()?;
        if !can_cancel_defect(Some(&actor), defect) {
            return Err(self.deny(&actor, "cancel", defect.id));
        }
        self.client
            .update_defect_status(defect.id, DefectStatus::Cancelled)
            .await
    }

    /// Edit-form save. A status in the payload must satisfy the same
    /// transition rule as the advance action.
    pub async fn update(
        &self,
        defect: &Defect,
        request: &UpdateDefectRequest,
    ) -> ClientResult<Defect> {
        let actor = self.actor()?;
        if !can_edit_defect(Some(&actor), defect) {
            return Err(self.deny(&actor, "edit", defect.id));
        }
        if let Some(to) = request.status {
            check_transition(defect.status, to)
                .map_err(|e| ClientError::Validation(e.to_string()))?;
        }
        DefectEditForm::check(request)?;
        self.client.update_defect(defect.id, request).await
    }

    pub async fn delete(&self, defect: &Defect) -> ClientResult<String> {
        let actor = self.actor()?;
        if !can_delete_defect(Some(&actor)) {
            return Err(self.deny(&actor, "delete", defect.id));
        }
        self.client.delete_defect(defect.id).await
    }
}

pub struct ProjectWorkflow<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectWorkflow<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn require_manager(&self) -> ClientResult<()> {
        let actor = self.client.session().user();
        if can_manage_projects(actor.as_ref()) {
            Ok(())
        } else {
            log::warn!("Project management denied for {:?}", actor.map(|u| u.id));
            Err(ClientError::Forbidden(
                "Only managers can manage projects".to_string(),
            ))
        }
    }

    pub async fn create(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        self.require_manager()?;
        self.client.create_project(request).await
    }

    pub async fn update(&self, id: i64, request: &UpdateProjectRequest) -> ClientResult<Project> {
        self.require_manager()?;
        self.client.update_project(id, request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<String> {
        self.require_manager()?;
        self.client.delete_project(id).await
    }
}

/// Report reads, open to managers and observers only.
pub struct ReportWorkflow<'a> {
    client: &'a ApiClient,
}

impl<'a> ReportWorkflow<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn require(&self, allowed: fn(Option<&User>) -> bool, what: &str) -> ClientResult<()> {
        let actor = self.client.session().user();
        if allowed(actor.as_ref()) {
            Ok(())
        } else {
            log::warn!("{} denied for {:?}", what, actor.map(|u| u.id));
            Err(ClientError::Forbidden(format!(
                "{} is available to managers and observers",
                what
            )))
        }
    }

    /// Server-side report, normalised into a summary.
    pub async fn summary(&self, filters: &DefectFilters) -> ClientResult<DefectSummary> {
        self.require(can_view_reports, "Reporting")?;
        let report = self.client.defects_report(filters).await?;
        Ok(DefectSummary::from_report(&report))
    }

    /// Summary of one page of defects, computed locally.
    pub async fn local_summary(&self, filters: &DefectFilters) -> ClientResult<DefectSummary> {
        self.require(can_view_reports, "Reporting")?;
        let list = self.client.list_defects(filters).await?;
        Ok(summarize(&list.defects, Utc::now()))
    }

    pub async fn export_csv(&self, filters: &DefectFilters) -> ClientResult<Vec<u8>> {
        self.require(can_export_reports, "Export")?;
        self.client.export_defects_csv(filters).await
    }

    pub async fn export_project(&self, project_id: i64) -> ClientResult<Vec<u8>> {
        self.require(can_export_reports, "Export")?;
        self.client.export_project_report(project_id).await
    }
}
