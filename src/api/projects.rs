use reqwest::Method;

use crate::api::client::ApiClient;
use crate::models::defect::DefectList;
use crate::models::project::{
    CreateProjectRequest, ProjectData, ProjectFilters, ProjectList, UpdateProjectRequest,
};
use crate::models::{DefectFilters, Project};
use crate::utils::errors::ClientResult;

impl ApiClient {
    pub async fn list_projects(&self, filters: &ProjectFilters) -> ClientResult<ProjectList> {
        self.get_query("/api/projects", filters).await
    }

    pub async fn get_project(&self, id: i64) -> ClientResult<Project> {
        let data: ProjectData = self.get(&format!("/api/projects/{}", id)).await?;
        Ok(data.project)
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        let data: ProjectData = self
            .send_json(Method::POST, "/api/projects", request)
            .await?;
        log::info!("Project created with ID: {}", data.project.id);
        Ok(data.project)
    }

    pub async fn update_project(
        &self,
        id: i64,
        request: &UpdateProjectRequest,
    ) -> ClientResult<Project> {
        let data: ProjectData = self
            .send_json(Method::PUT, &format!("/api/projects/{}", id), request)
            .await?;
        Ok(data.project)
    }

    pub async fn delete_project(&self, id: i64) -> ClientResult<String> {
        self.send_empty(Method::DELETE, &format!("/api/projects/{}", id))
            .await
    }

    pub async fn project_defects(
        &self,
        project_id: i64,
        filters: &DefectFilters,
    ) -> ClientResult<DefectList> {
        self.get_query(&format!("/api/projects/{}/defects", project_id), filters)
            .await
    }
}
