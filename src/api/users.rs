use reqwest::Method;
use serde::Deserialize;

use crate::api::client::ApiClient;
use crate::models::api::null_as_empty;
use crate::models::auth::{ChangePasswordRequest, UpdateProfileRequest, UserData};
use crate::models::User;
use crate::utils::errors::ClientResult;

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default, deserialize_with = "null_as_empty")]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct EngineerList {
    #[serde(default, deserialize_with = "null_as_empty")]
    engineers: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ManagerList {
    #[serde(default, deserialize_with = "null_as_empty")]
    managers: Vec<User>,
}

impl ApiClient {
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        let data: UserList = self.get("/api/users").await?;
        Ok(data.users)
    }

    /// Candidates for defect assignment.
    pub async fn engineers(&self) -> ClientResult<Vec<User>> {
        let data: EngineerList = self.get("/api/users/engineers").await?;
        Ok(data.engineers)
    }

    /// Candidates for project management.
    pub async fn managers(&self) -> ClientResult<Vec<User>> {
        let data: ManagerList = self.get("/api/users/managers").await?;
        Ok(data.managers)
    }

    pub async fn get_user(&self, id: i64) -> ClientResult<User> {
        let data: UserData = self.get(&format!("/api/users/{}", id)).await?;
        Ok(data.user)
    }

    /// Updates the profile and, when it is the logged-in user's, the session
    /// copy as well.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: &UpdateProfileRequest,
    ) -> ClientResult<User> {
        let data: UserData = self
            .send_json(Method::PUT, &format!("/api/users/{}", user_id), request)
            .await?;
        let is_self = self.session().user().map(|u| u.id) == Some(data.user.id);
        if is_self {
            self.session().set_user(data.user.clone())?;
        }
        Ok(data.user)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> ClientResult<String> {
        self.send_json_empty(Method::POST, "/api/users/change-password", request)
            .await
    }
}
