//! Studio state changes, broadcast to any number of observers.
//!
//! A presentation layer subscribes to [`EventBus`] and redraws on each
//! [`StudioEvent`]. Publishing never blocks and never fails.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use dgb_core::creativity::CreativityMode;
use dgb_core::types::JobId;

// ---------------------------------------------------------------------------
// StudioEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    AvailabilityChanged { connected: bool },
    PresetsLoaded { count: usize },
    ParametersUpdated { level: u8, mode: CreativityMode, known: bool },
    GenerationStarted { prompt: String, antigravity: u8 },
    GenerationSucceeded { job_id: JobId },
    GenerationFailed { message: String },
    ActiveTrackChanged { job_id: JobId },
    SignedIn { email: String },
    SignedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudioEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl StudioEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus for [`StudioEvent`]s.
///
/// Slow receivers that fall more than the capacity behind observe
/// `RecvError::Lagged` and skip ahead.
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, kind: EventKind) {
        // Only fails when nobody is listening.
        let _ = self.sender.send(StudioEvent::new(kind));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
