use crate::error::SettingsError;
use crate::relation::{RelationCatalog, RelationDescriptor, RelationResolver};
use crate::suggest::{PathSuggester, SuggestionLimits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Tunables for the rule chain editor. Every field has a default, so an empty
/// JSON object is a valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    #[serde(alias = "validation_debounce_ms")]
    pub validation_debounce_ms: u64,
    pub suggestions: SuggestionLimits,
    /// Replaces the built-in relation catalog when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationDescriptor>>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            validation_debounce_ms: 450,
            suggestions: SuggestionLimits::default(),
            relations: None,
        }
    }
}

impl EditorSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }

    pub fn relation_catalog(&self) -> RelationCatalog {
        match &self.relations {
            Some(entries) => RelationCatalog::new(entries.clone()),
            None => RelationCatalog::default(),
        }
    }

    pub fn relation_resolver(&self) -> RelationResolver {
        RelationResolver::new(self.relation_catalog())
    }

    pub fn path_suggester(&self) -> PathSuggester {
        PathSuggester::new(self.suggestions)
    }
}
