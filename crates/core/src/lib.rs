//! Domain logic for DGB Audio generation sessions.
//!
//! Pure, synchronous building blocks with no I/O:
//!
//! - [`creativity`]: the 0-100 creativity level and its named modes.
//! - [`music`]: genres, keys, tempo and duration ranges.
//! - [`preset`]: creative presets used to pre-fill the form.
//! - [`request`]: form state and the validated generation request.
//! - [`generation`]: results, parameters and the generation lifecycle.
//! - [`history`]: bounded per-session result history.
//! - [`playback`]: transport state over an [`playback::AudioSink`].
//! - [`session`]: the signed-in user's token and profile.

pub mod creativity;
pub mod error;
pub mod generation;
pub mod history;
pub mod music;
pub mod playback;
pub mod preset;
pub mod request;
pub mod session;
pub mod types;
