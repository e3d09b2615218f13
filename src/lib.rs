pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{plant_id::PlantIdClient, storage::LocalStorage};
pub use app::pipelines::DiagnosisPipeline;
pub use crate::core::{detector, engine::DiagnosisEngine, normalizer::normalize};
pub use domain::analysis::DiseaseAnalysisResult;
pub use utils::error::{DiagnosisError, Result};
