use std::collections::BTreeSet;

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const SEVERE_HEADACHE: &str = "severe_headache";
pub const VISION_CHANGES: &str = "vision_changes";
pub const HEAVY_BLEEDING: &str = "heavy_bleeding";
pub const NO_FETAL_MOVEMENT: &str = "no_fetal_movement";

const DEFAULT_CONCERNING: &[&str] = &[
    SEVERE_HEADACHE,
    VISION_CHANGES,
    HEAVY_BLEEDING,
    NO_FETAL_MOVEMENT,
];

const DEFAULT_MODERATE: &[&str] = &["swelling", "dizziness", "shortness_of_breath", "pain"];

/// A self-reported symptom tag. Trimmed and never empty; matching is exact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymptomTag(String);

impl SymptomTag {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("symptom tag must not be empty");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SymptomTag {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SymptomTag> for String {
    fn from(tag: SymptomTag) -> Self {
        tag.0
    }
}

impl std::fmt::Display for SymptomTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two classification sets the scorer checks tags against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    concerning: BTreeSet<SymptomTag>,
    moderate: BTreeSet<SymptomTag>,
}

impl SymptomVocabulary {
    pub fn new(
        concerning: impl IntoIterator<Item = SymptomTag>,
        moderate: impl IntoIterator<Item = SymptomTag>,
    ) -> Self {
        Self {
            concerning: concerning.into_iter().collect(),
            moderate: moderate.into_iter().collect(),
        }
    }

    /// Replaces whichever set is given and keeps the other.
    pub fn with_overrides(
        self,
        concerning: Option<Vec<SymptomTag>>,
        moderate: Option<Vec<SymptomTag>>,
    ) -> Self {
        Self {
            concerning: concerning.map_or(self.concerning, |tags| tags.into_iter().collect()),
            moderate: moderate.map_or(self.moderate, |tags| tags.into_iter().collect()),
        }
    }

    pub fn is_concerning(&self, tag: &SymptomTag) -> bool {
        self.concerning.contains(tag)
    }

    pub fn is_moderate(&self, tag: &SymptomTag) -> bool {
        self.moderate.contains(tag)
    }

    pub fn any_concerning(&self, tags: &[SymptomTag]) -> bool {
        tags.iter().any(|tag| self.is_concerning(tag))
    }

    pub fn any_moderate(&self, tags: &[SymptomTag]) -> bool {
        tags.iter().any(|tag| self.is_moderate(tag))
    }
}

impl Default for SymptomVocabulary {
    fn default() -> Self {
        let known = |tags: &[&str]| {
            tags.iter()
                .map(|tag| SymptomTag(tag.to_string()))
                .collect::<Vec<_>>()
        };
        Self::new(known(DEFAULT_CONCERNING), known(DEFAULT_MODERATE))
    }
}
