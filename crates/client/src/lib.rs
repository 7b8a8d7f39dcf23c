//! HTTP client for the DGB Audio backend.
//!
//! Provides the reqwest-based [`DgbApi`], typed wire schemas with
//! conversion into `dgb-core` domain types, and the [`StudioBackend`]
//! trait that session logic is written against.

pub mod api;
pub mod backend;
pub mod error;
pub mod messages;

pub use api::{DgbApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use backend::{fetch_parameters, StudioBackend};
pub use error::ClientError;
pub use messages::{GenerationOutcome, HealthStatus};
