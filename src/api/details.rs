use futures_util::future::try_join3;

use crate::api::client::ApiClient;
use crate::models::{Attachment, Comment, Defect};
use crate::utils::errors::ClientResult;

/// Everything the defect detail view shows, fetched together.
#[derive(Debug, Clone)]
pub struct DefectDetails {
    pub defect: Defect,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

impl DefectDetails {
    /// Fetch defect, comments and attachments concurrently. Fails as a whole
    /// if any of the three fails.
    pub async fn load(client: &ApiClient, defect_id: i64) -> ClientResult<Self> {
        let (defect, comments, attachments) = try_join3(
            client.get_defect(defect_id),
            client.defect_comments(defect_id),
            client.defect_attachments(defect_id),
        )
        .await?;

        Ok(DefectDetails {
            defect,
            comments,
            attachments,
        })
    }

    /// Reload in place after a mutation; on failure `self` is left as it was.
    pub async fn refresh(&mut self, client: &ApiClient) -> ClientResult<()> {
        *self = Self::load(client, self.defect.id).await?;
        Ok(())
    }
}
