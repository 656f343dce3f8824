use serde::{Deserialize, Serialize};

use crate::catalog::{Archetype, Augmentation, Build};

const DEFAULT_RULER_NAME: &str = "the ruler";

const STYLE_SUFFIX: &str = "Art style: Oil painting with visible brushstrokes, warm firelight and purple magical ambiance, \
ornate golden frame border, medieval fantasy aesthetic with a hint of steampunk. \
The portrait should look like it belongs in a castle gallery. \
Dramatic lighting from the left. Rich colors — deep purples, warm golds, ember oranges. \
The subject should look regal but approachable, like someone you'd follow into battle \
or trust with your kingdom's API keys. \
Portrait orientation, head and upper body, facing slightly left. \
Resolution: high quality, detailed.";

/// The user's chosen traits for one portrait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitSelection {
    pub archetype: Archetype,
    pub build: Build,
    pub augmentation: Augmentation,
    pub ruler_name: String,
    pub free_description: String,
}

impl TraitSelection {
    /// Builds a selection from raw string keys; unknown keys take the category default.
    pub fn from_keys(
        archetype: &str,
        build: &str,
        augmentation: &str,
        ruler_name: &str,
        free_description: &str,
    ) -> Self {
        Self {
            archetype: Archetype::from_key(archetype),
            build: Build::from_key(build),
            augmentation: Augmentation::from_key(augmentation),
            ruler_name: ruler_name.to_string(),
            free_description: free_description.to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        let name = self.ruler_name.trim();
        if name.is_empty() {
            DEFAULT_RULER_NAME
        } else {
            name
        }
    }
}

pub fn build_prompt(selection: &TraitSelection) -> String {
    let description = selection.free_description.trim();
    let name = selection.display_name();

    let mut prompt = format!(
        "Create a fantasy portrait painting in rich oil paint style. \
         This is a royal portrait of {name}, the new ruler of the Forge Kingdom. \
         Painted by a wizard named Merith who accidentally turns all his spells into art. \n\n"
    );

    if !description.is_empty() {
        prompt.push_str(&format!("Subject description: {description}\n"));
    }

    prompt.push_str(&format!(
        "Character archetype: {}. Physical build: {}. Special traits: {}. \n\n",
        selection.archetype.phrase(),
        selection.build.phrase(),
        selection.augmentation.phrase()
    ));
    prompt.push_str(STYLE_SUFFIX);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kaelen() -> TraitSelection {
        TraitSelection::from_keys("rogue", "slight", "psychic", "Kaelen", "")
    }

    #[test]
    fn identical_selections_build_identical_prompts() {
        let selection = TraitSelection::from_keys(
            "mystic",
            "imposing",
            "cybernetic",
            "Queen Ysolde",
            "silver hair, a scar over one eye",
        );
        assert_eq!(build_prompt(&selection), build_prompt(&selection.clone()));
    }

    #[test]
    fn resolves_trait_phrases_and_name() {
        let prompt = build_prompt(&kaelen());
        assert!(prompt.contains("royal portrait of Kaelen, the new ruler"));
        assert!(prompt.contains(Archetype::Rogue.phrase()));
        assert!(prompt.contains(Build::Slight.phrase()));
        assert!(prompt.contains(Augmentation::Psychic.phrase()));
        assert!(prompt.ends_with("Resolution: high quality, detailed."));
    }

    #[test]
    fn blank_description_omits_the_clause() {
        let mut selection = kaelen();
        selection.free_description = "   \n\t ".to_string();
        let prompt = build_prompt(&selection);
        assert!(!prompt.contains("Subject description:"));
        assert!(prompt.contains("art. \n\nCharacter archetype:"));
    }

    #[test]
    fn description_is_trimmed_and_kept_verbatim() {
        let mut selection = kaelen();
        selection.free_description = "  wears a crown of antlers  ".to_string();
        let prompt = build_prompt(&selection);
        assert!(prompt.contains("Subject description: wears a crown of antlers\nCharacter archetype:"));
    }

    #[test]
    fn unknown_keys_use_defaults_without_failing() {
        let selection = TraitSelection::from_keys("bard", "huge", "", "Ona", "");
        let prompt = build_prompt(&selection);
        assert!(prompt.contains(Archetype::Warrior.phrase()));
        assert!(prompt.contains(Build::Average.phrase()));
        assert!(prompt.contains(Augmentation::Organic.phrase()));
    }

    #[test]
    fn deserialized_selections_tolerate_unknown_and_missing_keys() {
        let selection: TraitSelection = serde_json::from_value(serde_json::json!({
            "archetype": "bard",
            "build": "IMPOSING",
            "ruler_name": "Ona"
        }))
        .expect("selection");
        assert_eq!(selection.archetype, Archetype::Warrior);
        assert_eq!(selection.build, Build::Imposing);
        assert_eq!(selection.augmentation, Augmentation::Organic);
        assert_eq!(selection.ruler_name, "Ona");
        assert!(selection.free_description.is_empty());
    }

    #[test]
    fn empty_name_uses_placeholder() {
        let selection = TraitSelection::from_keys("scholar", "average", "organic", "  ", "");
        let prompt = build_prompt(&selection);
        assert!(prompt.contains("royal portrait of the ruler, the new ruler"));
    }
}
