//! Wire shape of a plant.id v3 identification response.
//!
//! Every field is optional: the service omits sections freely and the
//! normalizer must tolerate absence at any depth. Suggestion lists stay as raw
//! JSON and only the entry actually consulted is decoded, so a malformed
//! lower-ranked suggestion never affects the result. A consulted field that is
//! present with the wrong JSON type fails deserialization, which the normalizer
//! turns into its error outcome.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Only the plant-presence flag. Decoded ahead of the full payload so a
/// negative verdict is honoured even when other sections are malformed.
#[derive(Debug, Default, Deserialize)]
pub struct PlantGate {
    pub result: Option<GateSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GateSection {
    pub is_plant: Option<BinaryVerdict>,
}

impl PlantGate {
    /// `false` only when the service positively says "not a plant".
    pub fn is_plant(&self) -> bool {
        self.result
            .as_ref()
            .and_then(|r| r.is_plant.as_ref())
            .and_then(|v| v.binary)
            .unwrap_or(true)
    }
}

#[derive(Debug, Deserialize)]
pub struct IdentificationResponse {
    pub result: Option<ResultSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultSection {
    pub is_plant: Option<BinaryVerdict>,
    pub classification: Option<SuggestionList>,
    pub is_healthy: Option<BinaryVerdict>,
    pub disease: Option<SuggestionList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinaryVerdict {
    pub binary: Option<bool>,
    pub probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionList {
    pub suggestions: Option<Vec<Value>>,
}

impl SuggestionList {
    /// Decodes the best match only. Service ranking is kept as-is, so the
    /// first entry is the best match; `None` when the list is absent or empty.
    pub fn top<'a, T: Deserialize<'a>>(&'a self) -> Option<Result<T, serde_json::Error>> {
        self.suggestions
            .as_deref()
            .and_then(|s| s.first())
            .map(|suggestion| T::deserialize(suggestion))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlantSuggestion {
    pub name: Option<String>,
    pub details: Option<PlantDetails>,
    pub similar_images: Option<Vec<SimilarImage>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlantDetails {
    pub common_names: Option<Vec<String>>,
    pub description: Option<TextBlock>,
    pub wiki_description: Option<TextBlock>,
    pub taxonomy: Option<RawTaxonomy>,
    pub similar_images: Option<Vec<SimilarImage>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextBlock {
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTaxonomy {
    pub class: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimilarImage {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiseaseSuggestion {
    pub name: Option<String>,
    pub probability: Option<f64>,
    pub details: Option<DiseaseDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiseaseDetails {
    pub common_names: Option<Vec<String>>,
    pub description: Option<String>,
    pub cause: Option<String>,
    pub treatment: Option<TreatmentPlan>,
}

/// Treatment advice grouped by approach (`chemical`, `biological`,
/// `prevention`, ...). Anything that is not a mapping carries no usable advice.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TreatmentPlan {
    Grouped(Map<String, Value>),
    Unstructured(IgnoredAny),
}

impl TreatmentPlan {
    /// Flattens the groups in source key order. Lists contribute their string
    /// items, plain strings contribute themselves, other shapes are skipped.
    pub fn steps(&self) -> Vec<String> {
        let groups = match self {
            TreatmentPlan::Grouped(groups) => groups,
            TreatmentPlan::Unstructured(_) => return Vec::new(),
        };

        let mut steps = Vec::new();
        for value in groups.values() {
            match value {
                Value::Array(items) => steps.extend(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|s| !s.trim().is_empty())
                        .map(str::to_string),
                ),
                Value::String(step) if !step.trim().is_empty() => steps.push(step.clone()),
                _ => {}
            }
        }
        steps
    }
}
