use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::api::client::ApiClient;
use crate::models::attachment::{AttachmentData, AttachmentList, FileUpload};
use crate::models::Attachment;
use crate::utils::errors::{ClientError, ClientResult};
use crate::utils::validation::AttachmentRules;

impl ApiClient {
    pub async fn defect_attachments(&self, defect_id: i64) -> ClientResult<Vec<Attachment>> {
        let data: AttachmentList = self
            .get(&format!("/api/attachments/defect/{}", defect_id))
            .await?;
        Ok(data.attachments)
    }

    /// Multipart upload under the `file` field. Size and type are checked
    /// against the configured limits first.
    pub async fn upload_attachment(
        &self,
        defect_id: i64,
        upload: FileUpload,
    ) -> ClientResult<Attachment> {
        let rules = AttachmentRules::from_config(self.config());
        let mime_type = rules.check(
            &upload.file_name,
            upload.size(),
            upload.mime_type.as_deref(),
        )?;

        log::info!(
            "Uploading {} ({} bytes) to defect {}",
            upload.file_name,
            upload.size(),
            defect_id
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime_type.as_ref())
            .map_err(|e| ClientError::Validation(format!("Invalid file type: {}", e)))?;
        let form = Form::new().part("file", part);

        let path = format!("/api/attachments/defect/{}", defect_id);
        let builder = self.request(Method::POST, &path).multipart(form);
        let data: AttachmentData = self.data(Method::POST, &path, builder).await?;
        Ok(data.attachment)
    }

    pub async fn download_attachment(&self, attachment_id: i64) -> ClientResult<Vec<u8>> {
        self.get_bytes(&format!("/api/attachments/{}/download", attachment_id))
            .await
    }

    pub async fn delete_attachment(&self, attachment_id: i64) -> ClientResult<String> {
        self.send_empty(Method::DELETE, &format!("/api/attachments/{}", attachment_id))
            .await
    }
}
