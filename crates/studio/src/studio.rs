//! One user's generation session.
//!
//! [`Studio`] ties the pieces together: it builds requests from the form,
//! guards and submits them through a [`StudioBackend`], files successful
//! results in the history, binds them to the player and publishes every
//! change on its [`EventBus`].

use dgb_client::{fetch_parameters, GenerationOutcome, HealthStatus, StudioBackend};
use dgb_core::creativity::CreativityLevel;
use dgb_core::error::CoreError;
use dgb_core::generation::{GenerationResult, GenerationTracker, ParameterView};
use dgb_core::history::HistoryStore;
use dgb_core::playback::{AudioSink, PlaybackController};
use dgb_core::preset::Preset;
use dgb_core::request::{build, GenerationForm};
use dgb_core::session::{AuthSession, UserProfile};

use crate::error::{GenerationError, SessionError};
use crate::events::{EventBus, EventKind};
use crate::session_store::SessionStore;

/// How far a retake pushes the creativity level.
pub const RETAKE_STEP: u8 = 10;

/// Failure message left behind when a generation future is dropped
/// before the backend answered.
pub const ABANDONED_MESSAGE: &str = "Generation was cancelled before it finished";

/// Fails the tracker if dropped while still armed, so an abandoned
/// `generate` future cannot leave the studio stuck in Generating.
struct InFlight<'a> {
    tracker: &'a mut GenerationTracker,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(tracker: &'a mut GenerationTracker) -> Self {
        Self {
            tracker,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && self.tracker.is_generating() {
            tracing::warn!("Generation abandoned before the backend answered");
            self.tracker.fail(ABANDONED_MESSAGE);
        }
    }
}

pub struct Studio<B: StudioBackend, S: AudioSink> {
    backend: B,
    session_store: SessionStore,
    session: Option<AuthSession>,
    health: Option<HealthStatus>,
    presets: Vec<Preset>,
    parameters: Option<ParameterView>,
    tracker: GenerationTracker,
    history: HistoryStore,
    player: PlaybackController<S>,
    last_form: Option<GenerationForm>,
    events: EventBus,
}

impl<B: StudioBackend, S: AudioSink> Studio<B, S> {
    /// A signed-out studio. Call [`restore_session`](Self::restore_session)
    /// to pick up a previous sign-in.
    pub fn new(backend: B, sink: S, session_store: SessionStore, history_cap: usize) -> Self {
        Self {
            backend,
            session_store,
            session: None,
            health: None,
            presets: Vec::new(),
            parameters: None,
            tracker: GenerationTracker::new(),
            history: HistoryStore::with_capacity(history_cap),
            player: PlaybackController::new(sink),
            last_form: None,
            events: EventBus::default(),
        }
    }

    // ---- accessors ----

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn health(&self) -> Option<&HealthStatus> {
        self.health.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.health.as_ref().is_some_and(|h| h.connected)
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn parameters(&self) -> Option<&ParameterView> {
        self.parameters.as_ref()
    }

    pub fn tracker(&self) -> &GenerationTracker {
        &self.tracker
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn player(&self) -> &PlaybackController<S> {
        &self.player
    }

    /// Transport controls and sink callbacks go through here.
    pub fn player_mut(&mut self) -> &mut PlaybackController<S> {
        &mut self.player
    }

    /// Message for the last failed generation, if that is the current state.
    pub fn error_message(&self) -> Option<&str> {
        self.tracker.error_message()
    }

    // ---- backend status ----

    /// Re-check the backend. Any failure counts as disconnected.
    pub async fn refresh_availability(&mut self) -> &HealthStatus {
        let health = match self.backend.health().await {
            Ok(health) => health,
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                HealthStatus::unreachable(e.to_string())
            }
        };
        let was_connected = self.is_connected();
        let first_check = self.health.is_none();
        if first_check || was_connected != health.connected {
            tracing::info!(connected = health.connected, "Backend availability changed");
            self.events.publish(EventKind::AvailabilityChanged {
                connected: health.connected,
            });
        }
        self.health.insert(health)
    }

    /// Fetch the preset catalog. A failed fetch leaves the list empty.
    pub async fn load_presets(&mut self) -> &[Preset] {
        self.presets = match self.backend.presets().await {
            Ok(presets) => presets,
            Err(e) => {
                tracing::warn!(error = %e, "Preset fetch failed");
                Vec::new()
            }
        };
        self.events.publish(EventKind::PresetsLoaded {
            count: self.presets.len(),
        });
        &self.presets
    }

    /// Look up what `level` will mean to the backend.
    pub async fn preview_parameters(&mut self, level: i64) -> &ParameterView {
        let level = CreativityLevel::new(level);
        let view = fetch_parameters(&self.backend, level).await;
        self.events.publish(EventKind::ParametersUpdated {
            level: view.level().value(),
            mode: view.mode(),
            known: view.params().is_some(),
        });
        self.parameters.insert(view)
    }

    // ---- generation ----

    /// Whether the generate action should be enabled right now.
    pub fn can_generate(&self) -> bool {
        self.session.is_some() && self.is_connected() && !self.tracker.is_generating()
    }

    /// Build, submit and file one generation.
    ///
    /// Local problems (bad form, signed out, backend down, already busy)
    /// are returned before anything is sent. On success the result is
    /// appended to the history and becomes the active track; on failure
    /// the history is left untouched.
    pub async fn generate(
        &mut self,
        form: &GenerationForm,
    ) -> Result<GenerationResult, GenerationError> {
        let request = build(form)?;
        let token = match &self.session {
            Some(session) => session.token.clone(),
            None => return Err(GenerationError::NotSignedIn),
        };
        if !self.is_connected() {
            return Err(GenerationError::ServiceUnavailable);
        }
        self.tracker
            .begin(request.clone())
            .map_err(|_| GenerationError::Busy)?;
        self.last_form = Some(form.clone());

        tracing::info!(
            genre = %request.genre,
            antigravity = request.antigravity_level.value(),
            duration = request.duration_seconds,
            "Generation started",
        );
        self.events.publish(EventKind::GenerationStarted {
            prompt: request.prompt.clone(),
            antigravity: request.antigravity_level.value(),
        });

        let guard = InFlight::new(&mut self.tracker);
        let reply = self.backend.generate(&token, &request).await;
        guard.disarm();

        let err = match reply {
            Ok(GenerationOutcome::Completed(result)) => {
                self.accept(result.clone());
                return Ok(result);
            }
            Ok(GenerationOutcome::Failed { job_id, error }) => {
                tracing::warn!(job_id = ?job_id, reason = %error, "Generation failed");
                GenerationError::GenerationFailed(error)
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation request failed");
                GenerationError::from(e)
            }
        };
        let message = err.to_string();
        self.tracker.fail(message.clone());
        self.events.publish(EventKind::GenerationFailed { message });
        Err(err)
    }

    /// Generate again from the last submitted form with the creativity
    /// level pushed up by [`RETAKE_STEP`].
    pub async fn retake(&mut self) -> Result<GenerationResult, GenerationError> {
        let mut form = self
            .last_form
            .clone()
            .ok_or_else(|| CoreError::Validation("Nothing to retake yet".into()))?;
        form.antigravity = CreativityLevel::new(form.antigravity)
            .raised_by(RETAKE_STEP)
            .value() as i64;
        self.generate(&form).await
    }

    /// Return from Succeeded/Failed to Idle. Ignored mid-generation.
    pub fn dismiss(&mut self) {
        if !self.tracker.is_generating() {
            self.tracker.reset();
        }
    }

    fn accept(&mut self, result: GenerationResult) {
        let job_id = result.job_id.clone();
        tracing::info!(job_id = %job_id, audio = %result.audio_reference, "Generation succeeded");
        self.tracker.succeed(job_id.clone());
        self.history.append(result.clone());
        // Just appended at the front, so the lookup cannot miss.
        let _ = self.history.select(&job_id);
        self.player.set_active(result);
        self.events.publish(EventKind::GenerationSucceeded {
            job_id: job_id.clone(),
        });
        self.events.publish(EventKind::ActiveTrackChanged { job_id });
    }

    // ---- history ----

    /// Make a history entry the active track.
    pub fn select(&mut self, job_id: &str) -> Result<GenerationResult, CoreError> {
        let result = self.history.select(job_id)?.clone();
        self.player.set_active(result.clone());
        self.events.publish(EventKind::ActiveTrackChanged {
            job_id: result.job_id.clone(),
        });
        Ok(result)
    }

    // ---- auth ----

    /// Adopt the session saved by a previous run, if any.
    pub fn restore_session(&mut self) -> Result<Option<&UserProfile>, SessionError> {
        self.session = self.session_store.load()?;
        if let Some(session) = &self.session {
            tracing::info!(email = %session.user.email, "Restored saved session");
        }
        Ok(self.session.as_ref().map(|s| &s.user))
    }

    pub async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        let session = self.backend.login(email, password).await?;
        self.session_store.save(&session)?;
        let same_user = self
            .session
            .as_ref()
            .is_some_and(|current| current.user.email == session.user.email);
        if !same_user {
            self.clear_session_state();
        }
        tracing::info!(email = %session.user.email, "Signed in");
        self.events.publish(EventKind::SignedIn {
            email: session.user.email.clone(),
        });
        Ok(&self.session.insert(session).user)
    }

    /// Forget the session and everything generated under it.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.session_store.clear()?;
        self.session = None;
        self.clear_session_state();
        tracing::info!("Signed out");
        self.events.publish(EventKind::SignedOut);
        Ok(())
    }

    fn clear_session_state(&mut self) {
        self.history = HistoryStore::with_capacity(self.history.capacity());
        self.player.clear();
        self.last_form = None;
        self.dismiss();
    }
}
