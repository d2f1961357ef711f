use reqwest::Method;

use crate::api::client::ApiClient;
use crate::models::comment::{CommentData, CommentList, CreateCommentRequest, UpdateCommentRequest};
use crate::models::Comment;
use crate::utils::errors::ClientResult;
use crate::utils::validation::CommentForm;

impl ApiClient {
    pub async fn defect_comments(&self, defect_id: i64) -> ClientResult<Vec<Comment>> {
        let data: CommentList = self
            .get(&format!("/api/comments/defect/{}", defect_id))
            .await?;
        Ok(data.comments)
    }

    /// Blank text is rejected before any request is made.
    pub async fn create_comment(&self, defect_id: i64, text: &str) -> ClientResult<Comment> {
        let text = CommentForm {
            text: text.to_string(),
        }
        .into_text()?;
        let data: CommentData = self
            .send_json(
                Method::POST,
                &format!("/api/comments/defect/{}", defect_id),
                &CreateCommentRequest { text, defect_id },
            )
            .await?;
        Ok(data.comment)
    }

    pub async fn update_comment(&self, comment_id: i64, text: &str) -> ClientResult<Comment> {
        let text = CommentForm {
            text: text.to_string(),
        }
        .into_text()?;
        let data: CommentData = self
            .send_json(
                Method::PUT,
                &format!("/api/comments/{}", comment_id),
                &UpdateCommentRequest { text },
            )
            .await?;
        Ok(data.comment)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ClientResult<String> {
        self.send_empty(Method::DELETE, &format!("/api/comments/{}", comment_id))
            .await
    }
}
