use crate::{
    config::Config,
    error::{AppError, Result},
    models::response::{ApiResponse, ErrorResponse},
    services::session::SessionStore,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// 请求携带哪个命名空间的令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    Anonymous,
    User,
    Manager,
}

/// REST客户端：拼接 `/api` 基础路径并附带 Bearer 令牌
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        url::Url::parse(&config.api_base_url)?;

        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, scope: AuthScope) -> Result<T> {
        let request = self.request(Method::GET, path, scope)?;
        self.send_json(request).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q, scope: AuthScope) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path, scope)?.query(query);
        self.send_json(request).await
    }

    /// 数据可能为空的GET请求（例如尚无阅读记录）
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        scope: AuthScope,
    ) -> Result<Option<T>> {
        let request = self.request(Method::GET, path, scope)?;
        match self.send_envelope(request).await {
            Ok(data) => Ok(data),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, scope: AuthScope) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, scope)?.json(body);
        self.send_json(request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, scope: AuthScope) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path, scope)?.json(body);
        self.send_json(request).await
    }

    /// 不关心响应数据的请求
    pub async fn execute(&self, method: Method, path: &str, scope: AuthScope) -> Result<()> {
        let request = self.request(method, path, scope)?;
        let response = request.send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str, scope: AuthScope) -> Result<RequestBuilder> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let builder = self.http_client.request(method, &url);

        let token = match scope {
            AuthScope::Anonymous => return Ok(builder),
            AuthScope::User => self.session.token(),
            AuthScope::Manager => self.session.manager_token(),
        };

        match token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(AppError::unauthorized("Not logged in")),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send_envelope(request)
            .await?
            .ok_or_else(|| AppError::internal("Response contained no data"))
    }

    async fn send_envelope<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(AppError::Api {
                status: reqwest::StatusCode::OK,
                code: None,
                message,
            });
        }
        Ok(envelope.data)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = serde_json::from_str::<ErrorResponse>(&body)
            .map(ErrorResponse::into_parts)
            .unwrap_or((None, None));
        let message = message
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        warn!("Request failed with {}: {}", status, message);
        Err(AppError::from_status(status, code, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = Config {
            api_base_url: "http://localhost:5000/api/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, SessionStore::in_memory()).unwrap();
        assert_eq!(client.url("/notifications"), "http://localhost:5000/api/notifications");
        assert_eq!(client.url("favorites/s1"), "http://localhost:5000/api/favorites/s1");
    }

    #[test]
    fn test_rejects_malformed_base_url() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            ApiClient::new(&config, SessionStore::in_memory()),
            Err(AppError::Url(_))
        ));
    }

    #[test]
    fn test_user_scope_requires_token() {
        let client = ApiClient::new(&Config::default(), SessionStore::in_memory()).unwrap();
        let err = client.request(Method::GET, "/auth/profile", AuthScope::User).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(client.request(Method::GET, "/stories", AuthScope::Anonymous).is_ok());
    }

    #[test]
    fn test_manager_scope_uses_manager_token() {
        let session = SessionStore::in_memory();
        session.set_item("token", "user-token").unwrap();
        session.set_manager_token("manager-token").unwrap();
        let client = ApiClient::new(&Config::default(), session).unwrap();

        let request = client
            .request(Method::GET, "/manager/stories", AuthScope::Manager)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer manager-token");
    }
}
