use crate::aggregate::DefectSummary;
use crate::api::client::ApiClient;
use crate::models::report::{DefectsReport, ProjectReport, ReportData};
use crate::models::DefectFilters;
use crate::sequence::RequestSequence;
use crate::utils::errors::ClientResult;

impl ApiClient {
    pub async fn defects_report(&self, filters: &DefectFilters) -> ClientResult<DefectsReport> {
        let data: ReportData<DefectsReport> =
            self.get_query("/api/reports/defects", filters).await?;
        Ok(data.report)
    }

    pub async fn project_report(&self, project_id: i64) -> ClientResult<ProjectReport> {
        let data: ReportData<ProjectReport> = self
            .get(&format!("/api/reports/projects/{}", project_id))
            .await?;
        Ok(data.report)
    }

    /// CSV bytes as produced by the server.
    pub async fn export_defects_csv(&self, filters: &DefectFilters) -> ClientResult<Vec<u8>> {
        self.get_bytes_query("/api/reports/defects/export", filters)
            .await
    }

    pub async fn export_project_report(&self, project_id: i64) -> ClientResult<Vec<u8>> {
        self.get_bytes(&format!("/api/reports/projects/{}/export", project_id))
            .await
    }
}

/// Reloads the defects report whenever filters change and keeps only the
/// answer to the most recent request.
#[derive(Debug, Clone)]
pub struct ReportLoader {
    client: ApiClient,
    sequence: RequestSequence,
}

impl ReportLoader {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
        }
    }

    /// `Ok(None)` means a newer load superseded this one and its result was
    /// discarded.
    pub async fn load(&self, filters: &DefectFilters) -> ClientResult<Option<DefectSummary>> {
        match self.sequence.run(self.client.defects_report(filters)).await {
            Some(report) => Ok(Some(DefectSummary::from_report(&report?))),
            None => Ok(None),
        }
    }
}
