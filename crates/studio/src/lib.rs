//! DGB Audio generation session.
//!
//! Wires the `dgb-core` domain types to a [`StudioBackend`](dgb_client::StudioBackend)
//! and exposes one [`Studio`] per user session, plus the environment
//! configuration and session persistence the binary needs.

pub mod config;
pub mod error;
pub mod events;
pub mod session_store;
pub mod studio;

pub use config::{ConfigError, StudioConfig};
pub use error::{GenerationError, SessionError};
pub use events::{EventBus, EventKind, StudioEvent};
pub use session_store::SessionStore;
pub use studio::Studio;
