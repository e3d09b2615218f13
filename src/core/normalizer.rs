//! Maps a raw identification response onto a [`DiseaseAnalysisResult`].
//!
//! The mapping is total: every JSON input yields exactly one of four
//! outcomes (not a plant, healthy, diseased, unreadable). Nothing here
//! performs I/O, so the functions can be called from any thread or task.

use crate::domain::analysis::{
    DiseaseAnalysisResult, DiseaseType, HealthFindings, PlantIdentity, Severity, Taxonomy,
    MAX_SIMILAR_IMAGES,
};
use crate::domain::raw::{
    DiseaseSuggestion, IdentificationResponse, PlantGate, PlantSuggestion, ResultSection,
    SimilarImage,
};
use serde::Deserialize;
use serde_json::Value;

const UNKNOWN_PLANT: &str = "Unknown Plant";
const IDENTIFICATION_FAILED: &str = "Identification failed";
const NO_DESCRIPTION: &str = "Could not confidently identify the plant species.";
const UNKNOWN_DISEASE: &str = "Unknown Disease";
const DEFAULT_SYMPTOM: &str = "Characteristic symptoms observed";
const DEFAULT_CAUSE: &str = "Environmental or biological factors";
const DEFAULT_TREATMENT: &str = "Consult an expert for specific treatment";

/// A detected disease, before it is merged with the plant identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseFinding {
    pub name: String,
    pub scientific_name: String,
    pub confidence: f64,
    pub symptoms: Vec<String>,
    pub possible_causes: Vec<String>,
    pub treatment: Vec<String>,
}

/// The outcome of reading one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// The service says the photo does not show a plant.
    InvalidImage,
    Healthy {
        identity: PlantIdentity,
        confidence: f64,
    },
    Diseased {
        identity: PlantIdentity,
        disease: DiseaseFinding,
    },
    /// The payload did not have the expected shape.
    Error { reason: String },
}

impl Diagnosis {
    pub fn disease_type(&self) -> DiseaseType {
        match self {
            Diagnosis::InvalidImage => DiseaseType::InvalidImage,
            Diagnosis::Healthy { .. } => DiseaseType::Healthy,
            Diagnosis::Diseased { .. } => DiseaseType::Unknown,
            Diagnosis::Error { .. } => DiseaseType::Error,
        }
    }

    pub fn into_result(self) -> DiseaseAnalysisResult {
        match self {
            Diagnosis::InvalidImage => DiseaseAnalysisResult::new(
                PlantIdentity {
                    plant_name: "Not a Plant".to_string(),
                    scientific_name: "Non-plant object detected".to_string(),
                    description: "The image does not appear to contain a plant. \
                                  Please upload a clear photo of a plant leaf."
                        .to_string(),
                    taxonomy: Taxonomy::default(),
                    similar_images: Vec::new(),
                },
                no_disease(
                    DiseaseType::InvalidImage,
                    0.0,
                    "Image is not a plant",
                    "Upload contained non-plant objects",
                    "Upload a valid plant image",
                ),
            ),
            Diagnosis::Healthy {
                identity,
                confidence,
            } => DiseaseAnalysisResult::new(
                identity,
                no_disease(
                    DiseaseType::Healthy,
                    confidence,
                    "No pathogenic symptoms detected",
                    "Optimal growing conditions",
                    "Continue standard care",
                ),
            ),
            Diagnosis::Diseased { identity, disease } => DiseaseAnalysisResult::new(
                identity,
                HealthFindings {
                    disease_detected: true,
                    disease_name: Some(disease.name),
                    disease_scientific_name: Some(disease.scientific_name),
                    // 服務在這個整合層級沒有提供更細的分類或嚴重度
                    disease_type: DiseaseType::Unknown,
                    severity: Severity::Moderate,
                    confidence: disease.confidence,
                    symptoms: disease.symptoms,
                    possible_causes: disease.possible_causes,
                    treatment: disease.treatment,
                },
            ),
            Diagnosis::Error { .. } => DiseaseAnalysisResult::new(
                PlantIdentity {
                    plant_name: "Error".to_string(),
                    scientific_name: "Error".to_string(),
                    description: "Error processing data".to_string(),
                    taxonomy: Taxonomy::default(),
                    similar_images: Vec::new(),
                },
                no_disease(
                    DiseaseType::Error,
                    0.0,
                    "Error processing API response",
                    "Unknown",
                    "Try again later",
                ),
            ),
        }
    }
}

fn no_disease(
    disease_type: DiseaseType,
    confidence: f64,
    symptom: &str,
    cause: &str,
    treatment: &str,
) -> HealthFindings {
    HealthFindings {
        disease_detected: false,
        disease_name: None,
        disease_scientific_name: None,
        disease_type,
        severity: Severity::None,
        confidence,
        symptoms: vec![symptom.to_string()],
        possible_causes: vec![cause.to_string()],
        treatment: vec![treatment.to_string()],
    }
}

/// Normalizes a raw response. Never fails; unreadable payloads become the
/// `error` case.
pub fn normalize(raw: &Value) -> DiseaseAnalysisResult {
    classify(raw).into_result()
}

pub fn classify(raw: &Value) -> Diagnosis {
    // 先只讀 is_plant，其他欄位壞掉也不影響「不是植物」的判定
    if let Ok(gate) = PlantGate::deserialize(raw) {
        if !gate.is_plant() {
            tracing::debug!("Identification service reports a non-plant image");
            return Diagnosis::InvalidImage;
        }
    }

    let response = match IdentificationResponse::deserialize(raw) {
        Ok(response) => response,
        Err(e) => return malformed(e),
    };

    let Some(section) = response.result else {
        tracing::warn!("⚠️ Identification payload has no 'result' section");
        return Diagnosis::Error {
            reason: "missing 'result' section".to_string(),
        };
    };

    classify_section(&section)
}

fn malformed(e: serde_json::Error) -> Diagnosis {
    tracing::warn!("⚠️ Unexpected identification payload shape: {}", e);
    Diagnosis::Error {
        reason: e.to_string(),
    }
}

fn classify_section(section: &ResultSection) -> Diagnosis {
    // 只解析實際用到的第一筆建議，後面幾筆格式有誤不影響結果
    let identity = match section
        .classification
        .as_ref()
        .and_then(|c| c.top::<PlantSuggestion>())
    {
        Some(Ok(suggestion)) => identify_plant(&suggestion),
        Some(Err(e)) => return malformed(e),
        None => unidentified_plant(),
    };

    let health = section.is_healthy.as_ref();
    let is_healthy = health.and_then(|h| h.binary).unwrap_or(true);
    let healthy = |identity: PlantIdentity| Diagnosis::Healthy {
        identity,
        confidence: to_percentage(health.and_then(|h| h.probability)),
    };
    if is_healthy {
        return healthy(identity);
    }

    match section
        .disease
        .as_ref()
        .and_then(|d| d.top::<DiseaseSuggestion>())
    {
        Some(Ok(disease)) => Diagnosis::Diseased {
            identity,
            disease: describe_disease(&disease),
        },
        Some(Err(e)) => malformed(e),
        None => healthy(identity),
    }
}

fn unidentified_plant() -> PlantIdentity {
    PlantIdentity {
        plant_name: UNKNOWN_PLANT.to_string(),
        scientific_name: IDENTIFICATION_FAILED.to_string(),
        description: NO_DESCRIPTION.to_string(),
        taxonomy: Taxonomy::default(),
        similar_images: Vec::new(),
    }
}

fn identify_plant(suggestion: &PlantSuggestion) -> PlantIdentity {
    let details = suggestion.details.as_ref();
    let scientific_name = non_blank(suggestion.name.as_deref());

    let plant_name = first_common_name(details.and_then(|d| d.common_names.as_deref()))
        .or_else(|| scientific_name.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_PLANT.to_string());

    let description = details
        .and_then(|d| non_blank(d.description.as_ref().and_then(|b| b.value.as_deref())))
        .or_else(|| {
            details.and_then(|d| non_blank(d.wiki_description.as_ref().and_then(|b| b.value.as_deref())))
        })
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    let taxonomy = details
        .and_then(|d| d.taxonomy.as_ref())
        .map(|t| Taxonomy {
            class: t.class.clone().unwrap_or_default(),
            family: t.family.clone().unwrap_or_default(),
            genus: t.genus.clone().unwrap_or_default(),
        })
        .unwrap_or_default();

    let gallery = suggestion
        .similar_images
        .as_deref()
        .or_else(|| details.and_then(|d| d.similar_images.as_deref()))
        .unwrap_or_default();

    PlantIdentity {
        plant_name,
        scientific_name: scientific_name.unwrap_or(IDENTIFICATION_FAILED).to_string(),
        description,
        taxonomy,
        similar_images: similar_image_urls(gallery),
    }
}

/// The service's top three matches, minus entries without a URL.
fn similar_image_urls(gallery: &[SimilarImage]) -> Vec<String> {
    gallery
        .iter()
        .take(MAX_SIMILAR_IMAGES)
        .filter_map(|img| non_blank(img.url.as_deref()))
        .map(str::to_string)
        .collect()
}

fn describe_disease(suggestion: &DiseaseSuggestion) -> DiseaseFinding {
    let details = suggestion.details.as_ref();
    let scientific_name = non_blank(suggestion.name.as_deref())
        .unwrap_or(UNKNOWN_DISEASE)
        .to_string();

    let name = first_common_name(details.and_then(|d| d.common_names.as_deref()))
        .unwrap_or_else(|| scientific_name.clone());

    let symptom = details
        .and_then(|d| non_blank(d.description.as_deref()))
        .unwrap_or(DEFAULT_SYMPTOM);
    let cause = details
        .and_then(|d| non_blank(d.cause.as_deref()))
        .unwrap_or(DEFAULT_CAUSE);

    let mut treatment = details
        .and_then(|d| d.treatment.as_ref())
        .map(|plan| plan.steps())
        .unwrap_or_default();
    if treatment.is_empty() {
        treatment.push(DEFAULT_TREATMENT.to_string());
    }

    DiseaseFinding {
        name,
        scientific_name,
        confidence: to_percentage(suggestion.probability),
        symptoms: vec![symptom.to_string()],
        possible_causes: vec![cause.to_string()],
        treatment,
    }
}

fn first_common_name(names: Option<&[String]>) -> Option<String> {
    names
        .and_then(|names| names.first())
        .and_then(|name| non_blank(Some(name.as_str())))
        .map(title_case)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Probability in [0, 1] to a percentage with two decimals.
fn to_percentage(probability: Option<f64>) -> f64 {
    let percent = probability.unwrap_or(0.0) * 100.0;
    (percent * 100.0).round() / 100.0
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest: "early blight" becomes "Early Blight".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
