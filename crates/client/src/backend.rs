//! The seam between session logic and the remote backend.
//!
//! [`StudioBackend`] is implemented by [`DgbApi`] for real traffic; tests
//! and alternative transports provide their own implementations.

use async_trait::async_trait;

use dgb_core::creativity::CreativityLevel;
use dgb_core::generation::{GenerationParameters, ParameterView};
use dgb_core::preset::Preset;
use dgb_core::request::GenerationRequest;
use dgb_core::session::AuthSession;

use crate::api::DgbApi;
use crate::error::ClientError;
use crate::messages::{GenerationOutcome, HealthStatus};

/// Remote operations a generation session needs.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ClientError>;

    async fn presets(&self) -> Result<Vec<Preset>, ClientError>;

    async fn parameters(&self, level: CreativityLevel)
        -> Result<GenerationParameters, ClientError>;

    /// Issue exactly one generation request. Never retries.
    async fn generate(
        &self,
        token: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ClientError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError>;
}

#[async_trait]
impl StudioBackend for DgbApi {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        DgbApi::health(self).await
    }

    async fn presets(&self) -> Result<Vec<Preset>, ClientError> {
        DgbApi::presets(self).await
    }

    async fn parameters(
        &self,
        level: CreativityLevel,
    ) -> Result<GenerationParameters, ClientError> {
        DgbApi::parameters(self, level).await
    }

    async fn generate(
        &self,
        token: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ClientError> {
        tracing::debug!(
            genre = %request.genre,
            antigravity = request.antigravity_level.value(),
            duration = request.duration_seconds,
            "Submitting generation",
        );
        DgbApi::generate(self, token, request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        DgbApi::login(self, email, password).await
    }
}

/// Look up the parameters for `level`, degrading to
/// [`ParameterView::Unknown`] on any failure.
pub async fn fetch_parameters<B>(backend: &B, level: CreativityLevel) -> ParameterView
where
    B: StudioBackend + ?Sized,
{
    match backend.parameters(level).await {
        Ok(params) => ParameterView::Known { level, params },
        Err(e) => {
            tracing::warn!(level = level.value(), error = %e, "Creativity parameter lookup failed");
            ParameterView::Unknown { level }
        }
    }
}
