use reqwest::Method;

use crate::api::client::ApiClient;
use crate::models::defect::{
    CreateDefectRequest, DefectData, DefectHistory, DefectHistoryEntry, DefectList,
    UpdateDefectRequest, UpdateStatusRequest,
};
use crate::models::{Defect, DefectFilters, DefectStatus};
use crate::utils::errors::ClientResult;

impl ApiClient {
    /// `GET /api/defects`. The configured page size is used unless the
    /// filters set one.
    pub async fn list_defects(&self, filters: &DefectFilters) -> ClientResult<DefectList> {
        let filters = self.with_page_size(filters);
        self.get_query("/api/defects", &filters).await
    }

    /// `GET /api/defects/my`: defects authored by or assigned to the caller.
    pub async fn my_defects(&self, filters: &DefectFilters) -> ClientResult<DefectList> {
        let filters = self.with_page_size(filters);
        self.get_query("/api/defects/my", &filters).await
    }

    pub async fn get_defect(&self, id: i64) -> ClientResult<Defect> {
        let data: DefectData = self.get(&format!("/api/defects/{}", id)).await?;
        Ok(data.defect)
    }

    pub async fn create_defect(&self, request: &CreateDefectRequest) -> ClientResult<Defect> {
        let data: DefectData = self
            .send_json(Method::POST, "/api/defects", request)
            .await?;
        log::info!("Defect created with ID: {}", data.defect.id);
        Ok(data.defect)
    }

    pub async fn update_defect(
        &self,
        id: i64,
        request: &UpdateDefectRequest,
    ) -> ClientResult<Defect> {
        let data: DefectData = self
            .send_json(Method::PUT, &format!("/api/defects/{}", id), request)
            .await?;
        Ok(data.defect)
    }

    /// `PATCH /api/defects/:id/status`.
    pub async fn update_defect_status(
        &self,
        id: i64,
        status: DefectStatus,
    ) -> ClientResult<Defect> {
        let data: DefectData = self
            .send_json(
                Method::PATCH,
                &format!("/api/defects/{}/status", id),
                &UpdateStatusRequest { status },
            )
            .await?;
        log::info!("Defect {} moved to {}", id, data.defect.status);
        Ok(data.defect)
    }

    pub async fn delete_defect(&self, id: i64) -> ClientResult<String> {
        self.send_empty(Method::DELETE, &format!("/api/defects/{}", id))
            .await
    }

    pub async fn defect_history(&self, id: i64) -> ClientResult<Vec<DefectHistoryEntry>> {
        let data: DefectHistory = self
            .get(&format!("/api/defects/{}/history", id))
            .await?;
        Ok(data.history)
    }

    fn with_page_size(&self, filters: &DefectFilters) -> DefectFilters {
        let mut filters = filters.clone();
        if filters.page_size.is_none() {
            filters.page_size = Some(self.config().default_page_size);
        }
        filters
    }
}
