use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::models::api::ApiResponse;
use crate::session::Session;
use crate::utils::errors::{ClientError, ClientResult};

/// Typed access to the defect-control REST API.
///
/// Every request carries the session's bearer token. A 401 from any endpoint
/// clears the session before the error is returned.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: AppConfig,
    session: Session,
}

impl ApiClient {
    pub fn new(config: AppConfig, session: Session) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(ApiClient {
            http,
            config,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.config.endpoint(path));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and map transport failures and non-2xx statuses to errors.
    pub(crate) async fn send(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
    ) -> ClientResult<Response> {
        log::info!("{} {}", method, path);

        let response = builder.send().await.map_err(|e| {
            log::error!("{} {} failed: {}", method, path, e);
            ClientError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(status, response).await;
        match status {
            StatusCode::UNAUTHORIZED => {
                log::warn!("{} {} rejected the session: {}", method, path, message);
                self.session.invalidate();
                Err(ClientError::Unauthorized(message))
            }
            StatusCode::FORBIDDEN => {
                log::warn!("{} {} forbidden: {}", method, path, message);
                Err(ClientError::Forbidden(message))
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            _ => {
                log::error!("{} {} returned {}: {}", method, path, status, message);
                Err(ClientError::Api { status, message })
            }
        }
    }

    pub(crate) async fn envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> ClientResult<ApiResponse<T>> {
        let response = self.send(&method, path, builder).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;

        if !envelope.success {
            let message = envelope
                .error_message()
                .unwrap_or("API request failed")
                .to_string();
            log::warn!("{} {} reported failure: {}", method, path, message);
            return Err(ClientError::Api { status, message });
        }
        Ok(envelope)
    }

    /// Unwrap `data` from a successful envelope.
    pub(crate) async fn data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> ClientResult<T> {
        self.envelope::<T>(method, path, builder)
            .await?
            .data
            .ok_or_else(|| ClientError::Api {
                status: StatusCode::OK,
                message: "Response contained no data".to_string(),
            })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path);
        self.data(Method::GET, path, builder).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.data(Method::GET, path, builder).await
    }

    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(method.clone(), path).json(body);
        self.data(method, path, builder).await
    }

    /// For endpoints whose only payload is the confirmation message.
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> ClientResult<String> {
        let builder = self.request(method.clone(), path);
        let envelope = self
            .envelope::<serde_json::Value>(method, path, builder)
            .await?;
        Ok(envelope.message)
    }

    pub(crate) async fn send_json_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<String>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method.clone(), path).json(body);
        let envelope = self
            .envelope::<serde_json::Value>(method, path, builder)
            .await?;
        Ok(envelope.message)
    }

    /// Raw body of a file or CSV download.
    pub(crate) async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let builder = self.request(Method::GET, path);
        self.bytes(path, builder).await
    }

    pub(crate) async fn get_bytes_query<Q>(&self, path: &str, query: &Q) -> ClientResult<Vec<u8>>
    where
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.bytes(path, builder).await
    }

    async fn bytes(&self, path: &str, builder: RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = self.send(&Method::GET, path, builder).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

async fn error_message(status: StatusCode, response: Response) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    };

    match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error_message().map(str::to_string))
            .unwrap_or_else(fallback),
        Err(_) => fallback(),
    }
}
