pub mod diagnosis_pipeline;

pub use diagnosis_pipeline::DiagnosisPipeline;
