use crate::utils::error::{DiagnosisError, Result};
use std::path::Path;
use url::Url;

/// 可上傳到辨識服務的圖片副檔名
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> DiagnosisError {
    DiagnosisError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// 副檔名比對不分大小寫 (`LEAF.JPG` 也接受)
pub fn validate_image_files(field_name: &str, files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(DiagnosisError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for file in files {
        let extension = Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| invalid(field_name, file, "File has no extension or invalid filename"))?;

        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(invalid(
                field_name,
                file,
                format!(
                    "Unsupported image type: {}. Allowed extensions: {}",
                    extension,
                    IMAGE_EXTENSIONS.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

/// API key 缺少或仍是未替換的 `${VAR}` 佔位符時視為未設定
pub fn validate_api_key(field_name: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() || (trimmed.starts_with("${") && trimmed.ends_with('}')) {
        return Err(DiagnosisError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
