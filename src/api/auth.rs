use reqwest::Method;

use crate::api::client::ApiClient;
use crate::models::auth::{LoginRequest, LoginResponseData, RegisterRequest, User, UserData};
use crate::utils::errors::ClientResult;
use crate::utils::validation::{LoginForm, RegisterForm};

impl ApiClient {
    /// `POST /auth/login`. On success the token and user are stored in the
    /// session.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<User> {
        log::info!("Login attempt for: {}", credentials.email);
        let data: LoginResponseData = self
            .send_json(Method::POST, "/auth/login", credentials)
            .await?;
        self.session().login(data.token, data.user.clone())?;
        log::info!("Login successful for user: {}", data.user.email);
        Ok(data.user)
    }

    /// Validate the form locally, then log in.
    pub async fn login_with_form(&self, form: LoginForm) -> ClientResult<User> {
        let request = form.into_request()?;
        self.login(&request).await
    }

    /// `POST /auth/register`. Does not log the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let data: UserData = self
            .send_json(Method::POST, "/auth/register", request)
            .await?;
        log::info!("Registered user: {}", data.user.email);
        Ok(data.user)
    }

    pub async fn register_with_form(&self, form: RegisterForm) -> ClientResult<User> {
        let request = form.into_request()?;
        self.register(&request).await
    }

    /// `GET /api/me`, refreshing the cached profile in the session.
    pub async fn current_user(&self) -> ClientResult<User> {
        let data: UserData = self.get("/api/me").await?;
        self.session().set_user(data.user.clone())?;
        Ok(data.user)
    }

    /// `POST /auth/logout`. Local state is cleared even if the call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.send_empty(Method::POST, "/auth/logout").await {
            log::warn!("Logout request failed: {}", e);
        }
        self.session().logout()?;
        log::info!("User logout successful");
        Ok(())
    }
}
