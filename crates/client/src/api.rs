//! REST API client for the DGB backend.
//!
//! Wraps the generation, preset, creativity-parameter, health and auth
//! endpoints using [`reqwest`]. Every request is bounded by the timeout
//! given at construction.

use std::time::Duration;

use reqwest::Url;

use dgb_core::creativity::CreativityLevel;
use dgb_core::generation::GenerationParameters;
use dgb_core::preset::{Preset, PresetList};
use dgb_core::request::GenerationRequest;
use dgb_core::session::{AuthSession, UserProfile};

use crate::error::ClientError;
use crate::messages::{
    error_reason, GenerationOutcome, HealthStatus, LoginRequest, RawGenerateResponse,
    RawLoginResponse,
};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default bound on a single request, generation included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for one DGB backend.
#[derive(Debug, Clone)]
pub struct DgbApi {
    client: reqwest::Client,
    base_url: Url,
}

impl DgbApi {
    /// Create a client for the API rooted at `base_url`,
    /// e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Request)?;
        Self::with_client(client, base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        // `Url::join` treats the last segment as a file unless the path
        // ends in a slash, which would drop the `/api` prefix.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::Url(format!("{base_url}: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check whether the generation backend is up.
    ///
    /// Sends `GET /acestep/health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.endpoint("acestep/health")?).send().await?;
        Self::parse_response(response).await
    }

    /// List the creative presets.
    ///
    /// Sends `GET /acestep/presets`.
    pub async fn presets(&self) -> Result<Vec<Preset>, ClientError> {
        let response = self.client.get(self.endpoint("acestep/presets")?).send().await?;
        let list: PresetList = Self::parse_response(response).await?;
        Ok(list.presets)
    }

    /// Ask the service which technical parameters a creativity level maps to.
    ///
    /// Sends `GET /acestep/antigravity/{level}`.
    pub async fn parameters(
        &self,
        level: CreativityLevel,
    ) -> Result<GenerationParameters, ClientError> {
        let url = self.endpoint(&format!("acestep/antigravity/{}", level.value()))?;
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    /// Submit a generation and wait for the service to finish it.
    ///
    /// Sends `POST /generate/music?token=...`. A `success: false` body, or a
    /// non-2xx status carrying a reason, comes back as
    /// [`GenerationOutcome::Failed`] with the reason untouched.
    pub async fn generate(
        &self,
        token: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ClientError> {
        let response = self
            .client
            .post(self.endpoint("generate/music")?)
            .query(&[("token", token)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return match error_reason(&body) {
                Some(error) => Ok(GenerationOutcome::Failed {
                    job_id: None,
                    error,
                }),
                None => Err(ClientError::Api {
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        let raw: RawGenerateResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        raw.into_outcome(&self.base_url)
    }

    /// Exchange credentials for a session token.
    ///
    /// Sends `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let response = self
            .client
            .post(self.endpoint("auth/login")?)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match error_reason(&body) {
                Some(reason) => ClientError::Rejected(reason),
                None => ClientError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let raw: RawLoginResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        raw.into_session()
    }

    /// Fetch the profile behind `token`. Expired tokens surface as
    /// [`ClientError::Api`] with a 401 status.
    ///
    /// Sends `GET /auth/me?token=...`.
    pub async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .client
            .get(self.endpoint("auth/me")?)
            .query(&[("token", token)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Url(format!("{path}: {e}")))
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let api = DgbApi::new("http://localhost:8000/api", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            api.endpoint("acestep/health").unwrap().as_str(),
            "http://localhost:8000/api/acestep/health"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            DgbApi::new("not a url", DEFAULT_TIMEOUT),
            Err(ClientError::Url(_))
        ));
    }
}
