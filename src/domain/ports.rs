use crate::domain::model::{DiagnosisBatch, RawIdentification};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote plant identification. Implementations return the raw response body
/// on success and a transport error for anything else.
pub trait IdentificationService: Send + Sync {
    /// `encoded_image` is plain base64 without a `data:` prefix.
    fn identify(
        &self,
        encoded_image: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn language(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn input_dir(&self) -> &str;
    fn images(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn archive_name(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn include_images(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawIdentification>>;
    async fn transform(&self, identifications: Vec<RawIdentification>) -> Result<DiagnosisBatch>;
    async fn load(&self, batch: DiagnosisBatch) -> Result<String>;
}
