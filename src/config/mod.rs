#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;

/// 兩種配置來源共用的檢查
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_url("service.endpoint", config.api_endpoint())?;
    validation::validate_api_key("service.api_key", config.api_key())?;
    validation::validate_non_empty_string("service.language", config.language())?;
    validation::validate_range("service.timeout_seconds", config.timeout_seconds(), 1, 600)?;
    validation::validate_path("batch.input_dir", config.input_dir())?;
    validation::validate_image_files("batch.images", config.images())?;
    validation::validate_positive_number("batch.concurrent_requests", config.concurrent_requests(), 1)?;
    validation::validate_path("output.path", config.output_path())?;
    validation::validate_non_empty_string("output.archive_name", config.archive_name())?;
    Ok(())
}
