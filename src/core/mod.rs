pub mod detector;
pub mod engine;
pub mod normalizer;
pub mod report;

pub use crate::domain::model::{
    BatchEntry, DiagnosisBatch, EntryOutcome, LeafImage, NamedReport, RawIdentification,
    RunSummary,
};
pub use crate::domain::ports::{ConfigProvider, IdentificationService, Pipeline, Storage};
pub use crate::utils::error::Result;
