//! Generation request builder.
//!
//! Turns raw form state into a [`GenerationRequest`] the generation
//! service will accept: preset text is merged into the prompt, numeric
//! inputs are clamped to their supported ranges and instrumental tracks
//! lose their lyrics. Building is purely local; a rejected form never
//! touches the network.

use serde::{Deserialize, Serialize};

use crate::creativity::CreativityLevel;
use crate::error::CoreError;
use crate::music::{
    clamp_bpm, clamp_duration_secs, validate_key, Genre, DEFAULT_BPM, DEFAULT_DURATION_SECS,
    DEFAULT_KEY,
};
use crate::preset::Preset;

/// Placed between preset text and the user's own prompt.
pub const PRESET_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Unvalidated user input, as edited in the create form.
///
/// Numeric fields are kept wide and signed so whatever the input widget
/// produced can be stored; [`build`] does the clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationForm {
    pub prompt: String,
    pub lyrics: String,
    /// When set, lyrics are dropped regardless of the textarea contents.
    pub instrumental: bool,
    pub genre: Genre,
    pub bpm: i64,
    pub key: String,
    pub duration_seconds: i64,
    pub antigravity: i64,
    /// Currently selected preset, if any.
    pub preset: Option<Preset>,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            lyrics: String::new(),
            instrumental: false,
            genre: Genre::default(),
            bpm: DEFAULT_BPM as i64,
            key: DEFAULT_KEY.to_string(),
            duration_seconds: DEFAULT_DURATION_SECS as i64,
            antigravity: CreativityLevel::default().value() as i64,
            preset: None,
        }
    }
}

impl GenerationForm {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Select `preset` and pre-fill genre, tempo, key and creativity from it.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.genre = preset.genre;
        self.bpm = preset.bpm as i64;
        self.key = preset.key.clone();
        self.antigravity = preset.antigravity.value() as i64;
        self.preset = Some(preset);
    }

    /// Deselect the preset. Pre-filled values are left as they are.
    pub fn clear_preset(&mut self) {
        self.preset = None;
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated generation request, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Empty means instrumental.
    pub lyrics: String,
    pub genre: Genre,
    pub bpm: u16,
    pub key: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u16,
    #[serde(rename = "antigravity")]
    pub antigravity_level: CreativityLevel,
}

/// Validate `form` and assemble the request.
///
/// Fails with a `prompt` field error when there is no prompt text and no
/// preset, and with a `key` field error for an unknown key.
pub fn build(form: &GenerationForm) -> Result<GenerationRequest, CoreError> {
    let prompt = compose_prompt(form.preset.as_ref(), &form.prompt)?;
    validate_key(&form.key)?;

    let lyrics = if form.instrumental {
        String::new()
    } else {
        form.lyrics.clone()
    };

    Ok(GenerationRequest {
        prompt,
        lyrics,
        genre: form.genre,
        bpm: clamp_bpm(form.bpm),
        key: form.key.clone(),
        duration_seconds: clamp_duration_secs(form.duration_seconds),
        antigravity_level: CreativityLevel::new(form.antigravity),
    })
}

/// Merge preset text and the user's prompt.
///
/// - preset + prompt -> `"{preset}, {prompt}"`
/// - preset only     -> `"{preset}"`
/// - prompt only     -> prompt, verbatim
/// - neither         -> error
fn compose_prompt(preset: Option<&Preset>, user_prompt: &str) -> Result<String, CoreError> {
    let has_user_text = !user_prompt.trim().is_empty();
    match preset {
        Some(p) if has_user_text => Ok(format!("{}{PRESET_SEPARATOR}{user_prompt}", p.prompt_hint)),
        Some(p) => Ok(p.prompt_hint.clone()),
        None if has_user_text => Ok(user_prompt.to_string()),
        None => Err(CoreError::invalid_field(
            "prompt",
            "Describe the music you want to create or pick a preset",
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::music::{MAX_BPM, MAX_DURATION_SECS, MIN_BPM, MIN_DURATION_SECS};

    fn preset() -> Preset {
        Preset {
            id: "salsa_dura".into(),
            genre: Genre::Salsa,
            bpm: 180,
            key: "G".into(),
            antigravity: CreativityLevel::new(45),
            description: "Hard salsa".into(),
            prompt_hint: "hard salsa, brass section".into(),
        }
    }

    // -- Prompt composition --

    #[test]
    fn empty_prompt_without_preset_is_rejected() {
        let form = GenerationForm::with_prompt("   ");
        assert_matches!(build(&form), Err(CoreError::InvalidField { field: "prompt", .. }));
    }

    #[test]
    fn prompt_used_verbatim_without_preset() {
        let form = GenerationForm::with_prompt("romantic guitar bachata");
        assert_eq!(build(&form).unwrap().prompt, "romantic guitar bachata");
    }

    #[test]
    fn preset_text_comes_first() {
        let mut form = GenerationForm::with_prompt("with a trumpet solo");
        form.apply_preset(preset());
        assert_eq!(
            build(&form).unwrap().prompt,
            "hard salsa, brass section, with a trumpet solo"
        );
    }

    #[test]
    fn preset_alone_is_enough_intent() {
        let mut form = GenerationForm::default();
        form.apply_preset(preset());
        assert_eq!(build(&form).unwrap().prompt, "hard salsa, brass section");
    }

    #[test]
    fn apply_preset_prefills_form() {
        let mut form = GenerationForm::default();
        form.apply_preset(preset());
        assert_eq!(form.genre, Genre::Salsa);
        assert_eq!(form.bpm, 180);
        assert_eq!(form.key, "G");
        assert_eq!(form.antigravity, 45);

        form.clear_preset();
        assert!(form.preset.is_none());
        assert_eq!(form.bpm, 180);
    }

    // -- Lyrics --

    #[test]
    fn instrumental_forces_empty_lyrics() {
        let mut form = GenerationForm::with_prompt("slow bolero");
        form.lyrics = "[Verse 1]\nBajo la luna".into();
        form.instrumental = true;
        assert_eq!(build(&form).unwrap().lyrics, "");
    }

    #[test]
    fn lyrics_kept_when_not_instrumental() {
        let mut form = GenerationForm::with_prompt("slow bolero");
        form.lyrics = "[Chorus]\nBaila conmigo".into();
        assert_eq!(build(&form).unwrap().lyrics, "[Chorus]\nBaila conmigo");
    }

    // -- Clamping --

    #[test]
    fn numeric_fields_are_clamped() {
        let mut form = GenerationForm::with_prompt("merengue");
        form.bpm = 20;
        form.duration_seconds = 900;
        form.antigravity = 180;
        let req = build(&form).unwrap();
        assert_eq!(req.bpm, MIN_BPM);
        assert_eq!(req.duration_seconds, MAX_DURATION_SECS);
        assert_eq!(req.antigravity_level.value(), 100);

        form.bpm = 999;
        form.duration_seconds = -4;
        form.antigravity = -1;
        let req = build(&form).unwrap();
        assert_eq!(req.bpm, MAX_BPM);
        assert_eq!(req.duration_seconds, MIN_DURATION_SECS);
        assert_eq!(req.antigravity_level.value(), 0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut form = GenerationForm::with_prompt("cumbia");
        form.key = "X".into();
        assert_matches!(build(&form), Err(CoreError::InvalidField { field: "key", .. }));
    }

    // -- Wire shape --

    #[test]
    fn request_serializes_with_service_field_names() {
        let mut form = GenerationForm::with_prompt("romantic guitar bachata");
        form.antigravity = 35;
        let json = serde_json::to_value(build(&form).unwrap()).unwrap();
        assert_eq!(json["duration"], 60);
        assert_eq!(json["antigravity"], 35);
        assert_eq!(json["genre"], "bachata");
        assert!(json.get("duration_seconds").is_none());
    }
}
