use crate::domain::ports::{ConfigProvider, IdentificationService};
use crate::utils::error::{DiagnosisError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://plant.id/api/v3/identification";

/// Detail fields requested alongside the identification.
pub const DETAIL_FIELDS: &str =
    "common_names,cause,treatment,description,url,classification,wiki_description,taxonomy,wiki_image";

#[derive(Debug, Serialize)]
struct IdentificationRequest<'a> {
    images: [String; 1],
    health: &'a str,
    similar_images: bool,
}

/// HTTP client for the Kindwise plant.id v3 identification endpoint.
#[derive(Debug, Clone)]
pub struct PlantIdClient {
    client: Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl PlantIdClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: language.into(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            config.api_key(),
            config.language(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Base64 of the raw image bytes, ready for [`IdentificationService::identify`].
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 去掉 `data:image/...;base64,` 前綴，只留下 base64 內容
pub fn strip_data_url(encoded: &str) -> &str {
    let trimmed = encoded.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(',') {
            return payload;
        }
    }
    trimmed
}

impl IdentificationService for PlantIdClient {
    async fn identify(&self, encoded_image: &str) -> Result<serde_json::Value> {
        let body = IdentificationRequest {
            images: [format!("data:image/jpeg;base64,{}", strip_data_url(encoded_image))],
            health: "all",
            similar_images: true,
        };

        tracing::debug!(
            "Sending identification request to {} ({} base64 chars)",
            self.endpoint,
            encoded_image.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Api-Key", &self.api_key)
            .query(&[("details", DETAIL_FIELDS), ("language", self.language.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Identification response status: {}", status);

        // 只有 200 / 201 算成功，其他狀態碼一律視為傳輸失敗
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Identification service error {}: {}", status, body);
            return Err(DiagnosisError::TransportError {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await?;
        tracing::info!("✅ Identification request completed");
        Ok(raw)
    }
}
