use crate::adapters::plant_id::DEFAULT_ENDPOINT;
use crate::config::validate_settings;
use crate::core::ConfigProvider;
use crate::utils::error::{DiagnosisError, Result};
use crate::utils::validation::{Validate, IMAGE_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_INPUT_DIR: &str = ".";
const DEFAULT_ARCHIVE: &str = "diagnosis_report.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub language: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub input_dir: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub archive_name: Option<String>,
    pub include_images: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DiagnosisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${KINDWISE_API_KEY})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DiagnosisError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `batch.images` 留空時，掃描 input_dir 內所有支援的圖片
    pub fn discover_images(&mut self) -> Result<usize> {
        if !self.batch.images.is_empty() {
            return Ok(self.batch.images.len());
        }

        let mut found: Vec<String> = std::fs::read_dir(self.input_dir())?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                Path::new(name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        found.sort();

        tracing::debug!("Discovered {} images in {}", found.len(), self.input_dir());
        self.batch.images = found;
        Ok(self.batch.images.len())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.service.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn api_key(&self) -> &str {
        &self.service.api_key
    }

    fn language(&self) -> &str {
        self.service.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(60)
    }

    fn input_dir(&self) -> &str {
        self.batch.input_dir.as_deref().unwrap_or(DEFAULT_INPUT_DIR)
    }

    fn images(&self) -> &[String] {
        &self.batch.images
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn archive_name(&self) -> &str {
        self.output.archive_name.as_deref().unwrap_or(DEFAULT_ARCHIVE)
    }

    fn concurrent_requests(&self) -> usize {
        self.batch.concurrent_requests.unwrap_or(4)
    }

    fn include_images(&self) -> bool {
        self.output.include_images.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}
