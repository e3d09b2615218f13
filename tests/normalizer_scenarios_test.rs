use leaf_diagnosis::core::normalizer::{classify, Diagnosis};
use leaf_diagnosis::domain::analysis::{DiseaseType, Severity};
use leaf_diagnosis::normalize;
use serde_json::{json, Value};

fn not_a_plant() -> Value {
    json!({"result": {"is_plant": {"binary": false}}})
}

fn healthy_rose() -> Value {
    json!({
        "result": {
            "is_plant": {"binary": true, "probability": 0.99},
            "classification": {"suggestions": [{
                "name": "Rosa gallica",
                "probability": 0.91,
                "details": {"common_names": ["rose", "French rose"]}
            }]},
            "is_healthy": {"binary": true, "probability": 0.95},
            "disease": {"suggestions": []}
        }
    })
}

fn septoria_leaf_spot() -> Value {
    json!({
        "result": {
            "is_plant": {"binary": true},
            "classification": {"suggestions": [{
                "name": "Solanum lycopersicum",
                "details": {"common_names": ["tomato"]}
            }]},
            "is_healthy": {"binary": false, "probability": 0.08},
            "disease": {"suggestions": [{
                "name": "Septoria lycopersici",
                "probability": 0.87,
                "details": {
                    "cause": "fungal infection",
                    "treatment": {"chemical": ["apply fungicide"]}
                }
            }]}
        }
    })
}

fn corpus() -> Vec<Value> {
    vec![
        not_a_plant(),
        healthy_rose(),
        septoria_leaf_spot(),
        json!({}),
        json!(null),
        json!([1, 2, 3]),
        json!("plain text"),
        json!({"result": null}),
        json!({"result": {"classification": {"suggestions": [{"details": "oops"}]}}}),
        json!({"result": {"disease": {"suggestions": [{"probability": "high"}]}, "is_healthy": {"binary": false}}}),
        json!({"result": {"classification": {"suggestions": [{
            "name": "Ficus lyrata",
            "similar_images": [
                {"url": "https://img.example/a.jpg"},
                {"url": "https://img.example/b.jpg"},
                {"url": "https://img.example/c.jpg"},
                {"url": "https://img.example/d.jpg"}
            ]
        }]}}}),
    ]
}

#[test]
fn test_scenario_a_not_a_plant() {
    let result = normalize(&not_a_plant());

    assert_eq!(result.plant_name(), "Not a Plant");
    assert_eq!(result.scientific_name(), "Non-plant object detected");
    assert_eq!(result.disease_type(), DiseaseType::InvalidImage);
    assert!(!result.disease_detected());
    assert_eq!(result.disease_name(), None);
    assert_eq!(result.severity(), Severity::None);
    assert_eq!(result.confidence(), 0.0);
    assert_eq!(result.symptoms(), ["Image is not a plant"]);
    assert_eq!(result.treatment(), ["Upload a valid plant image"]);
    assert!(result.similar_images().is_empty());
}

#[test]
fn test_scenario_b_healthy_rose() {
    let result = normalize(&healthy_rose());

    assert_eq!(result.plant_name(), "Rose");
    assert_eq!(result.scientific_name(), "Rosa gallica");
    assert_eq!(result.disease_type(), DiseaseType::Healthy);
    assert!(!result.disease_detected());
    assert_eq!(result.disease_name(), None);
    assert_eq!(result.severity(), Severity::None);
    assert_eq!(result.confidence(), 95.0);
    assert_eq!(result.symptoms(), ["No pathogenic symptoms detected"]);
    assert_eq!(result.possible_causes(), ["Optimal growing conditions"]);
    assert_eq!(result.treatment(), ["Continue standard care"]);
}

#[test]
fn test_scenario_c_septoria() {
    let result = normalize(&septoria_leaf_spot());

    assert_eq!(result.plant_name(), "Tomato");
    assert!(result.disease_detected());
    assert_eq!(result.disease_name(), Some("Septoria lycopersici"));
    assert_eq!(result.disease_scientific_name(), Some("Septoria lycopersici"));
    assert_eq!(result.disease_type(), DiseaseType::Unknown);
    assert_eq!(result.severity(), Severity::Moderate);
    assert_eq!(result.confidence(), 87.0);
    assert_eq!(result.symptoms(), ["Characteristic symptoms observed"]);
    assert_eq!(result.possible_causes(), ["fungal infection"]);
    assert_eq!(result.treatment(), ["apply fungicide"]);
}

#[test]
fn test_scenario_d_empty_object_is_error_case() {
    let result = normalize(&json!({}));

    assert_eq!(result.plant_name(), "Error");
    assert_eq!(result.scientific_name(), "Error");
    assert_eq!(result.description(), "Error processing data");
    assert_eq!(result.disease_type(), DiseaseType::Error);
    assert_eq!(result.disease_name(), None);
    assert_eq!(result.symptoms(), ["Error processing API response"]);
    assert_eq!(result.possible_causes(), ["Unknown"]);
    assert_eq!(result.treatment(), ["Try again later"]);
    assert!(matches!(classify(&json!({})), Diagnosis::Error { .. }));
}

#[test]
fn test_not_a_plant_wins_over_disease_sections() {
    let mut raw = septoria_leaf_spot();
    raw["result"]["is_plant"] = json!({"binary": false});

    assert_eq!(normalize(&raw).disease_type(), DiseaseType::InvalidImage);
}

#[test]
fn test_healthy_flag_or_empty_suggestions_means_healthy() {
    let mut flagged = septoria_leaf_spot();
    flagged["result"]["is_healthy"]["binary"] = json!(true);
    assert_eq!(normalize(&flagged).disease_type(), DiseaseType::Healthy);

    let mut empty = septoria_leaf_spot();
    empty["result"]["disease"]["suggestions"] = json!([]);
    let result = normalize(&empty);
    assert_eq!(result.disease_type(), DiseaseType::Healthy);
    assert_eq!(result.confidence(), 8.0);
}

#[test]
fn test_every_input_yields_a_consistent_result() {
    for raw in corpus() {
        let result = normalize(&raw);

        assert!(!result.plant_name().is_empty(), "{}", raw);
        assert!(!result.symptoms().is_empty(), "{}", raw);
        assert!(!result.possible_causes().is_empty(), "{}", raw);
        assert!(!result.treatment().is_empty(), "{}", raw);
        assert!(result.similar_images().len() <= 3, "{}", raw);
        assert_eq!(result.disease_name().is_some(), result.disease_detected(), "{}", raw);
        assert!((0.0..=100.0).contains(&result.confidence()), "{}", raw);
    }
}

#[test]
fn test_normalize_is_idempotent_apart_from_timestamp() {
    for raw in corpus() {
        let mut first = normalize(&raw).to_map();
        let mut second = normalize(&raw).to_map();
        first.remove("analysis_timestamp");
        second.remove("analysis_timestamp");

        assert_eq!(first, second, "{}", raw);
    }
}

#[test]
fn test_map_view_uses_serialized_vocabulary() {
    let map = normalize(&septoria_leaf_spot()).to_map();

    assert_eq!(map["disease_type"], "unknown");
    assert_eq!(map["severity"], "moderate");
    assert_eq!(map["taxonomy"], json!({"class": "", "family": "", "genus": ""}));
    assert!(map["analysis_timestamp"].is_string());
}
