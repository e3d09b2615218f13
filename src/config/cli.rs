use crate::adapters::plant_id::DEFAULT_ENDPOINT;
use crate::config::validate_settings;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::fmt;

#[derive(Clone, Parser)]
#[command(name = "leaf-diagnosis")]
#[command(about = "Diagnose plant leaf health with the plant.id identification service")]
pub struct CliConfig {
    /// Leaf photos to analyze (jpg, jpeg, png), relative to --input-dir
    #[arg(required = true)]
    pub images: Vec<String>,

    #[arg(long, default_value = ".")]
    pub input_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "diagnosis_report.zip")]
    pub archive_name: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "KINDWISE_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    #[arg(long, default_value = "en")]
    pub language: String,

    #[arg(long, default_value = "4")]
    pub concurrent_requests: usize,

    #[arg(long, default_value = "60")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Bundle the source images into the report archive")]
    pub include_images: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage between phases")]
    pub monitor: bool,
}

// API key 不可以出現在日誌裡
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("images", &self.images)
            .field("input_dir", &self.input_dir)
            .field("output_path", &self.output_path)
            .field("archive_name", &self.archive_name)
            .field("api_endpoint", &self.api_endpoint)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("language", &self.language)
            .field("concurrent_requests", &self.concurrent_requests)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("include_images", &self.include_images)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn images(&self) -> &[String] {
        &self.images
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn include_images(&self) -> bool {
        self.include_images
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::try_parse_from([
            "leaf-diagnosis",
            "--api-key",
            "secret-key",
            "leaf1.jpg",
            "leaf2.png",
        ])
        .unwrap();

        assert_eq!(config.images, vec!["leaf1.jpg", "leaf2.png"]);
        assert_eq!(config.api_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.language, "en");
        assert_eq!(config.concurrent_requests, 4);
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = CliConfig::try_parse_from([
            "leaf-diagnosis",
            "--api-key",
            "k",
            "--concurrent-requests",
            "0",
            "leaf.jpg",
        ])
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_images_are_required() {
        assert!(CliConfig::try_parse_from(["leaf-diagnosis", "--api-key", "k"]).is_err());
    }
}
