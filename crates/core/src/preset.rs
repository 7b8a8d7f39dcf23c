//! Creative presets: named shortcuts combining a prompt fragment, tempo,
//! key and creativity level.

use serde::{Deserialize, Serialize};

use crate::creativity::CreativityLevel;
use crate::music::{Genre, DEFAULT_BPM, DEFAULT_KEY};

/// A predefined combination of descriptive prompt text, BPM and key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable identifier, e.g. `"bachata_romantica"`.
    pub id: String,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default = "default_bpm")]
    pub bpm: u16,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub antigravity: CreativityLevel,
    /// Human-readable blurb shown under the preset button.
    #[serde(default)]
    pub description: String,
    /// Prompt fragment prepended to the user's own description.
    #[serde(alias = "prompt")]
    pub prompt_hint: String,
}

fn default_bpm() -> u16 {
    DEFAULT_BPM
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Preset {
    /// Title-cased display name derived from the id:
    /// `"bachata_romantica"` -> `"Bachata Romantica"`.
    pub fn display_name(&self) -> String {
        self.id
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of the presets listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresetList {
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Find a preset by id.
pub fn find_preset<'a>(presets: &'a [Preset], id: &str) -> Option<&'a Preset> {
    presets.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "presets": [
                {
                    "id": "bachata_romantica",
                    "genre": "bachata",
                    "bpm": 130,
                    "key": "Am",
                    "antigravity": 30,
                    "description": "Romantic bachata",
                    "prompt_hint": "romantic slow bachata, smooth guitar"
                },
                {
                    "id": "tropical_fusion",
                    "prompt": "experimental fusion"
                }
            ],
            "count": 2
        }"#
    }

    #[test]
    fn parses_listing_with_defaults_and_alias() {
        let list: PresetList = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(list.presets.len(), 2);

        let first = &list.presets[0];
        assert_eq!(first.bpm, 130);
        assert_eq!(first.antigravity.value(), 30);

        let second = &list.presets[1];
        assert_eq!(second.prompt_hint, "experimental fusion");
        assert_eq!(second.bpm, DEFAULT_BPM);
        assert_eq!(second.key, DEFAULT_KEY);
    }

    #[test]
    fn display_name_title_cases_id() {
        let list: PresetList = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(list.presets[0].display_name(), "Bachata Romantica");
    }

    #[test]
    fn find_preset_by_id() {
        let list: PresetList = serde_json::from_str(sample_json()).unwrap();
        assert!(find_preset(&list.presets, "tropical_fusion").is_some());
        assert!(find_preset(&list.presets, "missing").is_none());
    }
}
