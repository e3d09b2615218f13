//! Single-image diagnosis: one service round trip, then normalization.
//!
//! Transport failures come back as `Err`. A response that arrives but cannot
//! be read is not an error here; it becomes the `error` outcome of the
//! returned result.

use crate::adapters::plant_id::{encode_image, strip_data_url};
use crate::core::normalizer::normalize;
use crate::domain::analysis::DiseaseAnalysisResult;
use crate::domain::ports::IdentificationService;
use crate::utils::error::{DiagnosisError, Result};

pub async fn diagnose<I>(service: &I, image: &[u8]) -> Result<DiseaseAnalysisResult>
where
    I: IdentificationService + ?Sized,
{
    if image.is_empty() {
        return Err(DiagnosisError::ImageError {
            message: "no image bytes provided".to_string(),
        });
    }
    diagnose_encoded(service, &encode_image(image)).await
}

/// Accepts plain base64 or a `data:image/...;base64,` URL.
pub async fn diagnose_base64<I>(service: &I, encoded: &str) -> Result<DiseaseAnalysisResult>
where
    I: IdentificationService + ?Sized,
{
    let payload = strip_data_url(encoded);
    if payload.is_empty() {
        return Err(DiagnosisError::ImageError {
            message: "empty base64 image".to_string(),
        });
    }
    diagnose_encoded(service, payload).await
}

async fn diagnose_encoded<I>(service: &I, encoded: &str) -> Result<DiseaseAnalysisResult>
where
    I: IdentificationService + ?Sized,
{
    let raw = service.identify(encoded).await?;
    let result = normalize(&raw);
    tracing::info!(
        "🔬 Diagnosis: {} ({})",
        result.plant_name(),
        result.disease_type()
    );
    Ok(result)
}
