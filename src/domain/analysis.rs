use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const MAX_SIMILAR_IMAGES: usize = 3;

/// Drives downstream branching, so the set of values is a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseType {
    Healthy,
    Unknown,
    InvalidImage,
    Error,
}

impl DiseaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseType::Healthy => "healthy",
            DiseaseType::Unknown => "unknown",
            DiseaseType::InvalidImage => "invalid_image",
            DiseaseType::Error => "error",
        }
    }

    /// Whether this tag can accompany a detected disease.
    pub fn describes_disease(&self) -> bool {
        matches!(self, DiseaseType::Unknown)
    }
}

impl fmt::Display for DiseaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Moderate,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Moderate => "moderate",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranks are always present; an unknown rank is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub class: String,
    pub family: String,
    pub genus: String,
}

impl Taxonomy {
    pub fn ranks(&self) -> [(&'static str, &str); 3] {
        [
            ("class", self.class.as_str()),
            ("family", self.family.as_str()),
            ("genus", self.genus.as_str()),
        ]
    }
}

/// Who the plant is, independent of its health.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantIdentity {
    pub plant_name: String,
    pub scientific_name: String,
    pub description: String,
    pub taxonomy: Taxonomy,
    pub similar_images: Vec<String>,
}

/// What is wrong with the plant, if anything.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthFindings {
    pub disease_detected: bool,
    pub disease_name: Option<String>,
    pub disease_scientific_name: Option<String>,
    pub disease_type: DiseaseType,
    pub severity: Severity,
    pub confidence: f64,
    pub symptoms: Vec<String>,
    pub possible_causes: Vec<String>,
    pub treatment: Vec<String>,
}

/// The normalized diagnosis handed to every presentation consumer.
///
/// Fields are private: a value is built once by the normalizer, stamped with
/// its construction time, and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseAnalysisResult {
    plant_name: String,
    scientific_name: String,
    description: String,
    taxonomy: Taxonomy,
    disease_detected: bool,
    disease_name: Option<String>,
    disease_scientific_name: Option<String>,
    disease_type: DiseaseType,
    severity: Severity,
    confidence: f64,
    symptoms: Vec<String>,
    possible_causes: Vec<String>,
    treatment: Vec<String>,
    similar_images: Vec<String>,
    analysis_timestamp: DateTime<FixedOffset>,
}

impl DiseaseAnalysisResult {
    /// Panics when the parts break a field contract. Only the normalizer
    /// builds results, so a panic here is a bug in the normalizer.
    pub(crate) fn new(identity: PlantIdentity, findings: HealthFindings) -> Self {
        assert!(
            !identity.plant_name.trim().is_empty(),
            "plant_name must never be empty"
        );
        assert!(
            identity.similar_images.len() <= MAX_SIMILAR_IMAGES,
            "at most {} similar images, got {}",
            MAX_SIMILAR_IMAGES,
            identity.similar_images.len()
        );
        assert!(!findings.symptoms.is_empty(), "symptoms must never be empty");
        assert!(
            !findings.possible_causes.is_empty(),
            "possible_causes must never be empty"
        );
        assert!(!findings.treatment.is_empty(), "treatment must never be empty");
        assert_eq!(
            findings.disease_name.is_some(),
            findings.disease_detected,
            "disease_name is set exactly when a disease is detected"
        );
        assert!(
            !findings.disease_detected || findings.disease_type.describes_disease(),
            "disease_type '{}' cannot describe a detected disease",
            findings.disease_type
        );

        Self {
            plant_name: identity.plant_name,
            scientific_name: identity.scientific_name,
            description: identity.description,
            taxonomy: identity.taxonomy,
            disease_detected: findings.disease_detected,
            disease_name: findings.disease_name,
            disease_scientific_name: findings.disease_scientific_name,
            disease_type: findings.disease_type,
            severity: findings.severity,
            confidence: clamp_confidence(findings.confidence),
            symptoms: findings.symptoms,
            possible_causes: findings.possible_causes,
            treatment: findings.treatment,
            similar_images: identity.similar_images,
            analysis_timestamp: Local::now().fixed_offset(),
        }
    }

    pub fn plant_name(&self) -> &str {
        &self.plant_name
    }

    pub fn scientific_name(&self) -> &str {
        &self.scientific_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn disease_detected(&self) -> bool {
        self.disease_detected
    }

    pub fn disease_name(&self) -> Option<&str> {
        self.disease_name.as_deref()
    }

    pub fn disease_scientific_name(&self) -> Option<&str> {
        self.disease_scientific_name.as_deref()
    }

    pub fn disease_type(&self) -> DiseaseType {
        self.disease_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn possible_causes(&self) -> &[String] {
        &self.possible_causes
    }

    pub fn treatment(&self) -> &[String] {
        &self.treatment
    }

    pub fn similar_images(&self) -> &[String] {
        &self.similar_images
    }

    pub fn analysis_timestamp(&self) -> &DateTime<FixedOffset> {
        &self.analysis_timestamp
    }

    /// Plain key/value view for consumers that do not want the typed struct.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PlantIdentity {
        PlantIdentity {
            plant_name: "Tomato".to_string(),
            scientific_name: "Solanum lycopersicum".to_string(),
            description: String::new(),
            taxonomy: Taxonomy::default(),
            similar_images: vec![],
        }
    }

    fn healthy(confidence: f64) -> HealthFindings {
        HealthFindings {
            disease_detected: false,
            disease_name: None,
            disease_scientific_name: None,
            disease_type: DiseaseType::Healthy,
            severity: Severity::None,
            confidence,
            symptoms: vec!["No pathogenic symptoms detected".to_string()],
            possible_causes: vec!["Optimal growing conditions".to_string()],
            treatment: vec!["Continue standard care".to_string()],
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(DiseaseAnalysisResult::new(identity(), healthy(140.0)).confidence(), 100.0);
        assert_eq!(DiseaseAnalysisResult::new(identity(), healthy(-3.0)).confidence(), 0.0);
        assert_eq!(DiseaseAnalysisResult::new(identity(), healthy(f64::NAN)).confidence(), 0.0);
    }

    #[test]
    fn test_map_view_uses_contract_vocabulary() {
        let result = DiseaseAnalysisResult::new(identity(), healthy(91.5));
        let map = result.to_map();

        assert_eq!(map["disease_type"], "healthy");
        assert_eq!(map["severity"], "none");
        assert_eq!(map["disease_name"], Value::Null);
        assert_eq!(map["taxonomy"]["genus"], "");
        assert!(map["analysis_timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_clone_keeps_timestamp() {
        let result = DiseaseAnalysisResult::new(identity(), healthy(50.0));
        let copy = result.clone();
        assert_eq!(copy.analysis_timestamp(), result.analysis_timestamp());
    }

    #[test]
    #[should_panic(expected = "treatment must never be empty")]
    fn test_empty_treatment_fails_fast() {
        let mut findings = healthy(10.0);
        findings.treatment.clear();
        DiseaseAnalysisResult::new(identity(), findings);
    }

    #[test]
    #[should_panic(expected = "disease_name is set exactly when a disease is detected")]
    fn test_disease_name_without_detection_fails_fast() {
        let mut findings = healthy(10.0);
        findings.disease_name = Some("Early Blight".to_string());
        DiseaseAnalysisResult::new(identity(), findings);
    }

    #[test]
    #[should_panic(expected = "plant_name must never be empty")]
    fn test_blank_plant_name_fails_fast() {
        let mut plant = identity();
        plant.plant_name = "  ".to_string();
        DiseaseAnalysisResult::new(plant, healthy(10.0));
    }
}
