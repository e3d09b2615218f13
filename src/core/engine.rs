use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::ResourceMonitor;

/// Runs a batch through extract → transform → load.
pub struct DiagnosisEngine<P: Pipeline> {
    pipeline: P,
    monitor: ResourceMonitor,
}

impl<P: Pipeline> DiagnosisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: ResourceMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🌿 Starting leaf diagnosis batch");
        self.monitor.log_phase("Start");

        // Extract: 呼叫辨識服務
        let identifications = self.pipeline.extract().await?;
        tracing::info!("📥 Received {} identification responses", identifications.len());
        self.monitor.log_phase("Extract");

        // Transform: 正規化並產生報告
        let batch = self.pipeline.transform(identifications).await?;
        let analyzed = batch.analyzed_count();
        let transport_failures = batch.transport_failures();
        tracing::info!(
            "🔬 Normalized {} results ({} transport failures)",
            analyzed,
            transport_failures
        );
        self.monitor.log_phase("Transform");

        // Load
        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("📦 Reports saved to: {}", output_path);
        self.monitor.log_phase("Load");
        self.monitor.log_summary();

        Ok(RunSummary {
            output_path,
            analyzed,
            transport_failures,
        })
    }
}
