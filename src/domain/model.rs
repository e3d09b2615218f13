use crate::domain::analysis::DiseaseAnalysisResult;
use crate::utils::error::DiagnosisError;
use serde::Serialize;
use std::path::Path;

/// A leaf photo read from the source storage.
#[derive(Debug, Clone)]
pub struct LeafImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl LeafImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 檔名去掉目錄與副檔名，用來命名輸出的報告
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("leaf")
            .to_string()
    }

    pub fn file_name(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
            .to_string()
    }
}

/// The identification service's answer for one image, untouched.
#[derive(Debug)]
pub struct RawIdentification {
    pub image: LeafImage,
    pub response: Result<serde_json::Value, DiagnosisError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Analyzed { result: DiseaseAnalysisResult },
    TransportError { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub image: String,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
    #[serde(skip)]
    pub source: Option<LeafImage>,
}

impl BatchEntry {
    pub fn result(&self) -> Option<&DiseaseAnalysisResult> {
        match &self.outcome {
            EntryOutcome::Analyzed { result } => Some(result),
            EntryOutcome::TransportError { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamedReport {
    pub file_name: String,
    pub content: String,
}

/// Everything the load phase writes for one batch.
#[derive(Debug, Clone)]
pub struct DiagnosisBatch {
    pub entries: Vec<BatchEntry>,
    pub summary_csv: String,
    pub reports: Vec<NamedReport>,
}

impl DiagnosisBatch {
    pub fn analyzed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result().is_some()).count()
    }

    pub fn transport_failures(&self) -> usize {
        self.entries.len() - self.analyzed_count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub analyzed: usize,
    pub transport_failures: usize,
}
