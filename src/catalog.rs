//! Static trait and model tables used when composing portrait prompts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Archetype {
    #[default]
    Warrior,
    Scholar,
    Rogue,
    Mystic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Build {
    Imposing,
    #[default]
    Average,
    Slight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Augmentation {
    #[default]
    Organic,
    Cybernetic,
    Psychic,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

macro_rules! impl_from_key_string {
    ($($kind:ty),+) => {
        $(
            impl From<String> for $kind {
                fn from(key: String) -> Self {
                    <$kind>::from_key(&key)
                }
            }
        )+
    };
}

impl_from_key_string!(Archetype, Build, Augmentation);

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Warrior,
        Archetype::Scholar,
        Archetype::Rogue,
        Archetype::Mystic,
    ];

    /// Unknown keys resolve to the default archetype.
    pub fn from_key(key: &str) -> Self {
        match normalize_key(key).as_str() {
            "warrior" => Archetype::Warrior,
            "scholar" => Archetype::Scholar,
            "rogue" => Archetype::Rogue,
            "mystic" => Archetype::Mystic,
            _ => Archetype::default(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Archetype::Warrior => "warrior",
            Archetype::Scholar => "scholar",
            Archetype::Rogue => "rogue",
            Archetype::Mystic => "mystic",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Archetype::Warrior => {
                "battle-scarred warrior with confident stance and weathered armor"
            }
            Archetype::Scholar => "learned scholar with wise eyes, robes, and arcane symbols",
            Archetype::Rogue => {
                "cunning rogue with sharp features, hooded cloak, and hidden blades"
            }
            Archetype::Mystic => {
                "enigmatic mystic with glowing eyes, flowing ethereal garments, and an aura of power"
            }
        }
    }
}

impl Build {
    pub const ALL: [Build; 3] = [Build::Imposing, Build::Average, Build::Slight];

    /// Unknown keys resolve to the default build.
    pub fn from_key(key: &str) -> Self {
        match normalize_key(key).as_str() {
            "imposing" => Build::Imposing,
            "average" => Build::Average,
            "slight" => Build::Slight,
            _ => Build::default(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Build::Imposing => "imposing",
            Build::Average => "average",
            Build::Slight => "slight",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Build::Imposing => "tall and powerfully built, commanding presence",
            Build::Average => "average build, approachable and adaptable",
            Build::Slight => "lean and agile, quick and precise",
        }
    }
}

impl Augmentation {
    pub const ALL: [Augmentation; 3] = [
        Augmentation::Organic,
        Augmentation::Cybernetic,
        Augmentation::Psychic,
    ];

    /// Unknown keys resolve to the default augmentation.
    pub fn from_key(key: &str) -> Self {
        match normalize_key(key).as_str() {
            "organic" => Augmentation::Organic,
            "cybernetic" => Augmentation::Cybernetic,
            "psychic" => Augmentation::Psychic,
            _ => Augmentation::default(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Augmentation::Organic => "organic",
            Augmentation::Cybernetic => "cybernetic",
            Augmentation::Psychic => "psychic",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Augmentation::Organic => "fully organic, natural appearance",
            Augmentation::Cybernetic => {
                "visible cybernetic augmentations — glowing circuit lines, a mechanical arm or eye, chrome accents blended with medieval armor"
            }
            Augmentation::Psychic => {
                "psychic-touched — faint ethereal glow around the head, wisps of energy trailing from the eyes, slightly otherworldly appearance"
            }
        }
    }
}

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub id: &'static str,
    pub hint: &'static str,
}

pub const KNOWN_MODELS: [ModelInfo; 4] = [
    ModelInfo {
        id: "gemini-3-pro-image-preview",
        hint: "10 req/min · Best quality",
    },
    ModelInfo {
        id: "gemini-2.5-flash-image",
        hint: "10 req/min · Fast & good",
    },
    ModelInfo {
        id: "imagen-4.0-ultra-generate-001",
        hint: "5 req/min · Ultra resolution",
    },
    ModelInfo {
        id: "gemini-2.0-flash-exp-image-generation",
        hint: "10 req/min · Original classic",
    },
];

pub fn model_hint(model_id: &str) -> Option<&'static str> {
    let model_id = model_id.trim();
    KNOWN_MODELS
        .iter()
        .find(|info| info.id == model_id)
        .map(|info| info.hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_fall_back_to_category_defaults() {
        assert_eq!(Archetype::from_key("necromancer"), Archetype::Warrior);
        assert_eq!(Build::from_key(""), Build::Average);
        assert_eq!(Augmentation::from_key("steam-powered"), Augmentation::Organic);
    }

    #[test]
    fn keys_are_matched_case_insensitively() {
        assert_eq!(Archetype::from_key("  Rogue "), Archetype::Rogue);
        assert_eq!(Build::from_key("SLIGHT"), Build::Slight);
        assert_eq!(Augmentation::from_key("Psychic"), Augmentation::Psychic);
    }

    #[test]
    fn every_variant_round_trips_through_its_key() {
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::from_key(archetype.key()), archetype);
            assert!(!archetype.phrase().is_empty());
        }
        for build in Build::ALL {
            assert_eq!(Build::from_key(build.key()), build);
        }
        for augmentation in Augmentation::ALL {
            assert_eq!(Augmentation::from_key(augmentation.key()), augmentation);
        }
    }

    #[test]
    fn deserializing_unknown_keys_falls_back_to_defaults() {
        let archetype: Archetype = serde_json::from_value(json!("bard")).expect("archetype");
        assert_eq!(archetype, Archetype::Warrior);
        let build: Build = serde_json::from_value(json!(" Slight ")).expect("build");
        assert_eq!(build, Build::Slight);
        let augmentation: Augmentation = serde_json::from_value(json!("")).expect("augmentation");
        assert_eq!(augmentation, Augmentation::Organic);

        assert_eq!(serde_json::to_value(Archetype::Mystic).expect("json"), json!("mystic"));
    }

    #[test]
    fn model_hints_cover_known_models_only() {
        assert_eq!(model_hint(DEFAULT_IMAGE_MODEL), Some("10 req/min · Fast & good"));
        assert_eq!(
            model_hint("imagen-4.0-ultra-generate-001"),
            Some("5 req/min · Ultra resolution")
        );
        assert_eq!(model_hint("imagen-5"), None);
    }
}
