//! Creativity ("antigravity") level and its named modes.
//!
//! The 0-100 slider is bucketed into four modes by fixed thresholds.
//! Only the mode is derived locally: the numeric generation parameters
//! behind a level belong to the generation service and are fetched, never
//! computed here (see [`crate::generation::GenerationParameters`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Lowest creativity level.
pub const MIN_LEVEL: u8 = 0;
/// Highest creativity level.
pub const MAX_LEVEL: u8 = 100;
/// Slider position used when nothing else is chosen.
pub const DEFAULT_LEVEL: u8 = 50;

/// Levels below this are [`CreativityMode::Traditional`].
pub const BALANCED_THRESHOLD: u8 = 20;
/// Levels below this (and at least [`BALANCED_THRESHOLD`]) are balanced.
pub const CREATIVE_THRESHOLD: u8 = 50;
/// Levels at or above this are [`CreativityMode::Experimental`].
pub const EXPERIMENTAL_THRESHOLD: u8 = 80;

/// A creativity level, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct CreativityLevel(u8);

impl CreativityLevel {
    /// Build a level, clamping anything outside `[0, 100]` to the nearest bound.
    pub fn new(raw: i64) -> Self {
        Self(raw.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn mode(self) -> CreativityMode {
        mode_for(self)
    }

    /// Raise the level by `step`, saturating at [`MAX_LEVEL`].
    pub fn raised_by(self, step: u8) -> Self {
        Self::new(self.0 as i64 + step as i64)
    }
}

impl Default for CreativityLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL)
    }
}

impl From<i64> for CreativityLevel {
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}

impl From<CreativityLevel> for u8 {
    fn from(level: CreativityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for CreativityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Named creativity bucket. Variants are declared in increasing order of
/// experimentalness so the derived `Ord` follows the slider.
///
/// The generation service reports modes by their Spanish display names,
/// which are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativityMode {
    #[serde(alias = "Traditional", alias = "Tradicional", alias = "tradicional")]
    Traditional,
    #[serde(alias = "Balanced", alias = "Balanceado", alias = "balanceado")]
    Balanced,
    #[serde(alias = "Creative", alias = "Creativo", alias = "creativo")]
    Creative,
    #[serde(alias = "Experimental")]
    Experimental,
}

/// All modes in slider order.
pub const ALL_MODES: [CreativityMode; 4] = [
    CreativityMode::Traditional,
    CreativityMode::Balanced,
    CreativityMode::Creative,
    CreativityMode::Experimental,
];

impl CreativityMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Traditional => "Traditional",
            Self::Balanced => "Balanced",
            Self::Creative => "Creative",
            Self::Experimental => "Experimental",
        }
    }

    /// Display name used by the generation service.
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Traditional => "Tradicional",
            Self::Balanced => "Balanceado",
            Self::Creative => "Creativo",
            Self::Experimental => "Experimental",
        }
    }

    /// Accent color as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            Self::Traditional => "#00ff88",
            Self::Balanced => "#00d4ff",
            Self::Creative => "#ff9500",
            Self::Experimental => "#ff3366",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Traditional => "🎸",
            Self::Balanced => "🎹",
            Self::Creative => "🚀",
            Self::Experimental => "🌀",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Traditional => "Authentic sound, faithful to the genre",
            Self::Balanced => "Balance between tradition and innovation",
            Self::Creative => "Exploring new sonic territory",
            Self::Experimental => "Breaking every rule",
        }
    }

    /// Inclusive level range covered by this mode.
    pub fn range(self) -> (u8, u8) {
        match self {
            Self::Traditional => (MIN_LEVEL, BALANCED_THRESHOLD - 1),
            Self::Balanced => (BALANCED_THRESHOLD, CREATIVE_THRESHOLD - 1),
            Self::Creative => (CREATIVE_THRESHOLD, EXPERIMENTAL_THRESHOLD - 1),
            Self::Experimental => (EXPERIMENTAL_THRESHOLD, MAX_LEVEL),
        }
    }
}

impl fmt::Display for CreativityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CreativityMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ALL_MODES
            .into_iter()
            .find(|mode| {
                mode.label().eq_ignore_ascii_case(needle)
                    || mode.service_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CoreError::Validation(format!("Unknown creativity mode '{needle}'")))
    }
}

/// Map a level to its mode. Total over the whole clamped range.
pub fn mode_for(level: CreativityLevel) -> CreativityMode {
    match level.value() {
        l if l < BALANCED_THRESHOLD => CreativityMode::Traditional,
        l if l < CREATIVE_THRESHOLD => CreativityMode::Balanced,
        l if l < EXPERIMENTAL_THRESHOLD => CreativityMode::Creative,
        _ => CreativityMode::Experimental,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
