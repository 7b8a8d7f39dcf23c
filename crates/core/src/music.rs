//! Musical vocabulary accepted by the generation service: genres, keys,
//! and the supported tempo and duration ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// Genres the generation service has style hints for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Genre {
    #[default]
    #[serde(rename = "bachata")]
    Bachata,
    #[serde(rename = "bolero")]
    Bolero,
    #[serde(rename = "merengue")]
    Merengue,
    #[serde(rename = "salsa")]
    Salsa,
    #[serde(rename = "cumbia")]
    Cumbia,
    #[serde(rename = "reggaeton")]
    Reggaeton,
    #[serde(rename = "son")]
    Son,
    #[serde(rename = "tropical")]
    Tropical,
    #[serde(rename = "latin pop")]
    LatinPop,
    #[serde(rename = "latin rock")]
    LatinRock,
    #[serde(rename = "flamenco")]
    Flamenco,
    #[serde(rename = "tango")]
    Tango,
    #[serde(rename = "bossa nova")]
    BossaNova,
    #[serde(rename = "samba")]
    Samba,
}

/// Every supported genre, in the order the service lists them.
pub const ALL_GENRES: [Genre; 14] = [
    Genre::Bachata,
    Genre::Bolero,
    Genre::Merengue,
    Genre::Salsa,
    Genre::Cumbia,
    Genre::Reggaeton,
    Genre::Son,
    Genre::Tropical,
    Genre::LatinPop,
    Genre::LatinRock,
    Genre::Flamenco,
    Genre::Tango,
    Genre::BossaNova,
    Genre::Samba,
];

impl Genre {
    /// Wire identifier, e.g. `"bossa nova"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bachata => "bachata",
            Self::Bolero => "bolero",
            Self::Merengue => "merengue",
            Self::Salsa => "salsa",
            Self::Cumbia => "cumbia",
            Self::Reggaeton => "reggaeton",
            Self::Son => "son",
            Self::Tropical => "tropical",
            Self::LatinPop => "latin pop",
            Self::LatinRock => "latin rock",
            Self::Flamenco => "flamenco",
            Self::Tango => "tango",
            Self::BossaNova => "bossa nova",
            Self::Samba => "samba",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = CoreError;

    /// Case-insensitive; underscores and hyphens count as spaces so that
    /// `"bossa_nova"` and `"Bossa-Nova"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        ALL_GENRES
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::invalid_field(
                    "genre",
                    format!(
                        "Unknown genre '{}'. Must be one of: {}",
                        s.trim(),
                        ALL_GENRES.map(Genre::as_str).join(", ")
                    ),
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Key used when nothing else is chosen.
pub const DEFAULT_KEY: &str = "Am";

/// All keys offered by the key selector.
pub const VALID_KEYS: &[&str] = &[
    "C", "Cm", "D", "Dm", "E", "Em", "F", "Fm", "G", "Gm", "A", "Am", "B", "Bm",
];

/// Validate that `key` is one of [`VALID_KEYS`] (case-sensitive: `Am` and
/// `AM` are not the same thing to a musician).
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if VALID_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(CoreError::invalid_field(
            "key",
            format!("Unknown key '{key}'. Must be one of: {}", VALID_KEYS.join(", ")),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tempo and duration
// ---------------------------------------------------------------------------

/// Slowest tempo the service accepts.
pub const MIN_BPM: u16 = 60;
/// Fastest tempo the service accepts.
pub const MAX_BPM: u16 = 200;
pub const DEFAULT_BPM: u16 = 120;

/// Shortest track length in seconds.
pub const MIN_DURATION_SECS: u16 = 30;
/// Longest track length in seconds (four minutes).
pub const MAX_DURATION_SECS: u16 = 240;
pub const DEFAULT_DURATION_SECS: u16 = 60;

pub fn clamp_bpm(bpm: i64) -> u16 {
    bpm.clamp(MIN_BPM as i64, MAX_BPM as i64) as u16
}

pub fn clamp_duration_secs(secs: i64) -> u16 {
    secs.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
