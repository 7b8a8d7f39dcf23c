//! Wire schemas for the DGB backend and their conversion into domain
//! types.
//!
//! Responses are parsed into loose `Raw*` structs first and then
//! converted into tagged Rust enums immediately, so nothing past this
//! module ever looks at an optional field to decide what happened.

use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use dgb_core::generation::{GenerationParameters, GenerationResult};
use dgb_core::session::{AuthSession, UserProfile};

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Outcome of a completed `POST /generate/music` call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The service produced a track.
    Completed(GenerationResult),
    /// The service answered but could not produce a track.
    Failed {
        job_id: Option<String>,
        /// Service-provided reason, unmodified.
        error: String,
    },
}

/// Raw `POST /generate/music` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct RawGenerateResponse {
    success: bool,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    prompt_used: Option<String>,
    #[serde(default)]
    antigravity_params: Option<GenerationParameters>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    audio_reference: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    lyrics_used: Option<String>,
    #[serde(default)]
    duration: Option<u16>,
}

/// Fallback failure text when the service sends `success: false` without
/// a reason.
pub const UNSPECIFIED_FAILURE: &str = "Generation failed";

impl RawGenerateResponse {
    /// Convert into a [`GenerationOutcome`], resolving the audio reference
    /// against `base`.
    pub(crate) fn into_outcome(self, base: &Url) -> Result<GenerationOutcome, ClientError> {
        if !self.success {
            return Ok(GenerationOutcome::Failed {
                job_id: self.job_id,
                error: self
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string()),
            });
        }

        let job_id = self
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::Decode("successful response without job_id".into()))?;
        let reference = [self.audio_url.as_deref(), self.audio_reference.as_deref()]
            .into_iter()
            .flatten()
            .find(|r| !r.trim().is_empty());
        let audio_reference = resolve_audio_reference(base, reference, &job_id)?;

        Ok(GenerationOutcome::Completed(GenerationResult {
            job_id,
            success: true,
            prompt_used: self.prompt_used.unwrap_or_default(),
            antigravity_params: self.antigravity_params.unwrap_or_default(),
            audio_reference,
            error: None,
            seed: self.seed,
            lyrics_used: self.lyrics_used,
            duration_seconds: self.duration,
            received_at: Utc::now(),
        }))
    }
}

/// Turn whatever the service sent into an absolute, streamable URL.
///
/// - absolute `http(s)` URLs are kept as they are;
/// - anything else is a path under the API base (a leading `/` does not
///   escape the API prefix);
/// - nothing at all falls back to `audio/{job_id}.wav`.
pub fn resolve_audio_reference(
    base: &Url,
    reference: Option<&str>,
    job_id: &str,
) -> Result<String, ClientError> {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty());
    match reference {
        Some(r) if r.starts_with("http://") || r.starts_with("https://") => Ok(r.to_string()),
        Some(r) => join(base, r.trim_start_matches('/')),
        None => join(base, &format!("audio/{job_id}.wav")),
    }
}

fn join(base: &Url, path: &str) -> Result<String, ClientError> {
    base.join(path)
        .map(String::from)
        .map_err(|e| ClientError::Url(format!("{path}: {e}")))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Availability of the generation backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub connected: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub checkpoint: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    /// Status used when the health endpoint itself is unreachable.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            connected: false,
            status: Some("offline".into()),
            error: Some(reason.into()),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Raw `POST /auth/login` body. Errors come back either as `error` or,
/// for framework-level rejections, as `detail`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawLoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Fallback when a login is refused without a reason.
pub const LOGIN_REFUSED: &str = "Authentication failed";

impl RawLoginResponse {
    pub(crate) fn into_session(self) -> Result<AuthSession, ClientError> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Ok(AuthSession { token, user }),
            _ => Err(ClientError::Rejected(
                self.error
                    .or_else(|| self.detail.as_ref().map(detail_text))
                    .unwrap_or_else(|| LOGIN_REFUSED.to_string()),
            )),
        }
    }
}

fn detail_text(detail: &serde_json::Value) -> String {
    match detail {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull a human-readable reason out of an error body, if it has one.
pub(crate) fn error_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| value.get("detail").map(detail_text))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/api/").unwrap()
    }

    fn parse(json: &str) -> Result<GenerationOutcome, ClientError> {
        serde_json::from_str::<RawGenerateResponse>(json)
            .unwrap()
            .into_outcome(&base())
    }

    // -- Generation --

    #[test]
    fn both_audio_fields_prefer_audio_url() {
        let outcome = parse(
            r#"{"success": true, "job_id": "job_abc",
                "audio_url": "/audio/job_abc.wav",
                "audio_reference": "/audio/other.wav"}"#,
        )
        .unwrap();
        assert_matches!(
            outcome,
            GenerationOutcome::Completed(r)
                if r.audio_reference == "http://localhost:8000/api/audio/job_abc.wav"
        );
    }

    #[test]
    fn audio_reference_alone_is_used() {
        let outcome = parse(
            r#"{"success": true, "job_id": "job_abc", "audio_reference": "https://cdn.example.com/a.wav"}"#,
        )
        .unwrap();
        assert_matches!(
            outcome,
            GenerationOutcome::Completed(r) if r.audio_reference == "https://cdn.example.com/a.wav"
        );
    }

    #[test]
    fn unknown_mode_does_not_fail_a_success() {
        let outcome = parse(
            r#"{"success": true, "job_id": "job_abc", "antigravity_params": {"mode": "Modo Libre"}}"#,
        )
        .unwrap();
        assert_matches!(
            outcome,
            GenerationOutcome::Completed(r) if r.antigravity_params.mode.is_none()
        );
    }

    #[test]
    fn success_response_becomes_completed_result() {
        let outcome = parse(
            r#"{"success": true, "job_id": "job_abc", "status": "completed",
                "prompt_used": "romantic guitar bachata",
                "antigravity_params": {"guidance_scale": 6.5, "infer_step": 80, "mode": "Balanceado"},
                "audio_url": "/audio/job_abc.wav", "seed": 42, "duration": 60}"#,
        )
        .unwrap();

        let result = match outcome {
            GenerationOutcome::Completed(r) => r,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(result.job_id, "job_abc");
        assert_eq!(result.prompt_used, "romantic guitar bachata");
        assert_eq!(result.antigravity_params.infer_steps, Some(80));
        assert_eq!(result.audio_reference, "http://localhost:8000/api/audio/job_abc.wav");
        assert_eq!(result.seed, Some(42));
        assert_eq!(result.duration_seconds, Some(60));
    }

    #[test]
    fn failure_message_is_passed_through_unmodified() {
        let outcome = parse(r#"{"success": false, "error": "model overloaded"}"#).unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::Failed {
                job_id: None,
                error: "model overloaded".into()
            }
        );
    }

    #[test]
    fn failure_without_reason_gets_generic_text() {
        let outcome = parse(r#"{"success": false, "job_id": "dgb_1"}"#).unwrap();
        assert_matches!(outcome, GenerationOutcome::Failed { error, .. } if error == UNSPECIFIED_FAILURE);
    }

    #[test]
    fn success_without_job_id_is_malformed() {
        assert_matches!(parse(r#"{"success": true}"#), Err(ClientError::Decode(_)));
    }

    // -- Audio references --

    #[test]
    fn audio_reference_resolution() {
        let b = base();
        assert_eq!(
            resolve_audio_reference(&b, Some("https://cdn.example.com/a.wav"), "j").unwrap(),
            "https://cdn.example.com/a.wav"
        );
        assert_eq!(
            resolve_audio_reference(&b, Some("audio/j.wav"), "j").unwrap(),
            "http://localhost:8000/api/audio/j.wav"
        );
        assert_eq!(
            resolve_audio_reference(&b, None, "job_9").unwrap(),
            "http://localhost:8000/api/audio/job_9.wav"
        );
        assert_eq!(
            resolve_audio_reference(&b, Some("  "), "job_9").unwrap(),
            "http://localhost:8000/api/audio/job_9.wav"
        );
    }

    // -- Auth --

    #[test]
    fn login_with_token_yields_session() {
        let raw: RawLoginResponse = serde_json::from_str(
            r#"{"success": true, "token": "t0k", "user": {"id": "usr_1", "email": "ana@example.com", "name": "Ana"}}"#,
        )
        .unwrap();
        let session = raw.into_session().unwrap();
        assert_eq!(session.token, "t0k");
        assert_eq!(session.user.name, "Ana");
    }

    #[test]
    fn login_error_is_rejected_with_reason() {
        let raw: RawLoginResponse =
            serde_json::from_str(r#"{"error": "Invalid email or password"}"#).unwrap();
        assert_matches!(raw.into_session(), Err(ClientError::Rejected(msg)) if msg == "Invalid email or password");
    }

    #[test]
    fn error_reason_reads_error_or_detail() {
        assert_eq!(error_reason(r#"{"error": "boom"}"#).as_deref(), Some("boom"));
        assert_eq!(error_reason(r#"{"detail": "Invalid token"}"#).as_deref(), Some("Invalid token"));
        assert_eq!(error_reason("<html>"), None);
    }
}
