//! Generation results and the client-side generation lifecycle
//! (Idle -> Generating -> Succeeded | Failed).
//!
//! The service answers synchronously and reports no intermediate
//! progress, so while a request is in flight the only honest thing to show
//! is an indeterminate indicator with the elapsed time.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};

use crate::creativity::{CreativityLevel, CreativityMode};
use crate::error::CoreError;
use crate::request::GenerationRequest;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Technical parameters the service derived from a creativity level.
///
/// Read-only: every value comes from the service. Fields the service did
/// not send stay `None` and are simply not displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    #[serde(default)]
    pub guidance_scale: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub cfg_rescale: Option<f64>,
    #[serde(default, alias = "infer_step")]
    pub infer_steps: Option<u32>,
    #[serde(default)]
    pub omega_scale: Option<f64>,
    #[serde(default)]
    pub cfg_type: Option<String>,
    #[serde(default)]
    pub scheduler_type: Option<String>,
    /// Unrecognised mode names read as `None`.
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: Option<CreativityMode>,
    #[serde(default)]
    pub antigravity_level: Option<CreativityLevel>,
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<Option<CreativityMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| name.parse().ok()))
}

impl GenerationParameters {
    /// Label/value pairs for the technical-parameters panel, skipping
    /// anything the service left out.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(v) = self.guidance_scale {
            rows.push(("Guidance Scale", format!("{v}")));
        }
        if let Some(v) = self.temperature {
            rows.push(("Temperature", format!("{v}")));
        }
        if let Some(v) = self.cfg_rescale {
            rows.push(("CFG Rescale", format!("{v}")));
        }
        if let Some(v) = self.infer_steps {
            rows.push(("Infer Steps", v.to_string()));
        }
        rows
    }
}

/// What the parameters panel can show for the current slider position.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterView {
    /// The service answered for `level`.
    Known {
        level: CreativityLevel,
        params: GenerationParameters,
    },
    /// The lookup failed; render the slider without the panel.
    Unknown { level: CreativityLevel },
}

impl ParameterView {
    pub fn level(&self) -> CreativityLevel {
        match self {
            Self::Known { level, .. } | Self::Unknown { level } => *level,
        }
    }

    /// Mode to badge the slider with. Prefers the service's answer and
    /// falls back to the local thresholds.
    pub fn mode(&self) -> CreativityMode {
        match self {
            Self::Known { params, level } => params.mode.unwrap_or_else(|| level.mode()),
            Self::Unknown { level } => level.mode(),
        }
    }

    pub fn params(&self) -> Option<&GenerationParameters> {
        match self {
            Self::Known { params, .. } => Some(params),
            Self::Unknown { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One completed generation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub job_id: JobId,
    pub success: bool,
    /// Prompt the service actually used, after its own enrichment.
    pub prompt_used: String,
    pub antigravity_params: GenerationParameters,
    /// Absolute, streamable locator for the generated audio.
    pub audio_reference: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub lyrics_used: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u16>,
    pub received_at: Timestamp,
}

impl GenerationResult {
    /// First 12 characters of the job id, for compact history rows.
    pub fn short_id(&self) -> &str {
        match self.job_id.char_indices().nth(12) {
            Some((idx, _)) => &self.job_id[..idx],
            None => &self.job_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Progress shown while a generation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Nothing is running.
    None,
    /// Running for `elapsed`; no completion estimate exists.
    Indeterminate { elapsed: Duration },
}

/// Where the current generation stands.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Idle,
    Generating {
        request: GenerationRequest,
        started_at: Instant,
    },
    Succeeded {
        job_id: JobId,
    },
    Failed {
        /// Message ready for display.
        message: String,
    },
}

/// Single-owner tracker for the generation state machine.
#[derive(Debug, Clone)]
pub struct GenerationTracker {
    state: GenerationState,
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
        }
    }
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, GenerationState::Generating { .. })
    }

    /// Enter `Generating`. Allowed from any other state.
    pub fn begin(&mut self, request: GenerationRequest) -> Result<(), CoreError> {
        if self.is_generating() {
            return Err(CoreError::Validation(
                "A generation is already in progress".to_string(),
            ));
        }
        self.state = GenerationState::Generating {
            request,
            started_at: Instant::now(),
        };
        Ok(())
    }

    /// The in-flight request, if any.
    pub fn in_flight(&self) -> Option<&GenerationRequest> {
        match &self.state {
            GenerationState::Generating { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn succeed(&mut self, job_id: impl Into<JobId>) {
        self.state = GenerationState::Succeeded {
            job_id: job_id.into(),
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = GenerationState::Failed {
            message: message.into(),
        };
    }

    /// Back to `Idle`, dropping any displayed outcome.
    pub fn reset(&mut self) {
        self.state = GenerationState::Idle;
    }

    /// Message of the last failure, if the tracker is in `Failed`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            GenerationState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress_at(Instant::now())
    }

    pub fn progress_at(&self, now: Instant) -> Progress {
        match &self.state {
            GenerationState::Generating { started_at, .. } => Progress::Indeterminate {
                elapsed: now.saturating_duration_since(*started_at),
            },
            _ => Progress::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
