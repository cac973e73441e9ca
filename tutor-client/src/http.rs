//! HTTP client for network-based API calls

use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use shared::ValidationError;
use shared::error::{ErrorBody, ErrorKind};

use crate::{ClientError, ClientResult};

/// Authenticated JSON / multipart client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create a client sharing this one's connection pool and token but a different base URL
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: self.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the bearer header
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.client.get(self.url(path));
        self.send("GET", path, request).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        self.send("GET", path, request).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send("POST", path, request).await
    }

    /// Make a PATCH request carrying its arguments in the query string
    pub async fn patch_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let request = self.client.patch(self.url(path)).query(query);
        self.send("PATCH", path, request).await
    }

    /// Make a POST request with a multipart form body
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ClientResult<T> {
        let request = self.client.post(self.url(path)).multipart(form);
        self.send("POST", path, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        tracing::debug!(method, path, "Dispatching request");
        let response = self.authorize(request).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// Non-2xx replies are mapped from their status and `{detail}` body; an
    /// unparsable error body still yields an error carrying the status.
    /// A 2xx reply whose body cannot be decoded is an `InvalidResponse`.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message())
                .unwrap_or_else(|_| format!("request failed with status {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %detail, "Request failed");
            return Err(error_from_status(status, detail));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::InvalidResponse(format!(
                "could not decode {} response body: {}",
                status.as_u16(),
                e
            ))
        })
    }
}

/// Map a non-2xx status and its detail onto the error taxonomy
pub(crate) fn error_from_status(status: StatusCode, detail: String) -> ClientError {
    match ErrorKind::from_status(status) {
        ErrorKind::Validation => ClientError::Validation(ValidationError::new(detail)),
        ErrorKind::Auth => ClientError::Auth { status, detail },
        ErrorKind::NotFound => ClientError::NotFound(detail),
        ErrorKind::Conflict => ClientError::Conflict(detail),
        ErrorKind::Server => ClientError::Server { status, detail },
    }
}
