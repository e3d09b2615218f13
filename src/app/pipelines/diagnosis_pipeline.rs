use crate::adapters::plant_id::encode_image;
use crate::core::normalizer::normalize;
use crate::core::report::{render_text_report, summary_csv};
use crate::core::{
    BatchEntry, ConfigProvider, DiagnosisBatch, EntryOutcome, IdentificationService, LeafImage,
    NamedReport, Pipeline, RawIdentification, Storage,
};
use crate::utils::error::{DiagnosisError, Result};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

/// Batch pipeline: leaf photos in, one report archive out.
///
/// Images are read from `source` (relative to the configured input
/// directory), the archive is written to `sink`.
pub struct DiagnosisPipeline<S: Storage, C: ConfigProvider, I: IdentificationService> {
    pub(crate) source: S,
    pub(crate) sink: S,
    pub(crate) config: C,
    pub(crate) service: Arc<I>,
}

impl<S, C, I> DiagnosisPipeline<S, C, I>
where
    S: Storage,
    C: ConfigProvider,
    I: IdentificationService + 'static,
{
    pub fn new(source: S, sink: S, config: C, service: I) -> Self {
        Self {
            source,
            sink,
            config,
            service: Arc::new(service),
        }
    }

    async fn read_images(&self) -> Result<Vec<LeafImage>> {
        let mut images = Vec::with_capacity(self.config.images().len());

        for name in self.config.images() {
            let bytes = self.source.read_file(name).await?;
            if bytes.is_empty() {
                return Err(DiagnosisError::ImageError {
                    message: format!("{} is empty", name),
                });
            }
            tracing::debug!("Read {} ({} bytes)", name, bytes.len());
            images.push(LeafImage::new(name.clone(), bytes));
        }

        Ok(images)
    }
}

/// 同名的報告加上序號，避免 ZIP 內檔名重複
fn unique_name(used: &mut HashSet<String>, stem: &str) -> String {
    let mut candidate = stem.to_string();
    let mut counter = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", stem, counter);
        counter += 1;
    }
    candidate
}

#[async_trait::async_trait]
impl<S, C, I> Pipeline for DiagnosisPipeline<S, C, I>
where
    S: Storage,
    C: ConfigProvider,
    I: IdentificationService + 'static,
{
    async fn extract(&self) -> Result<Vec<RawIdentification>> {
        let images = self.read_images().await?;
        let limit = self.config.concurrent_requests().max(1);

        tracing::info!(
            "🚀 Identifying {} images ({} concurrent requests)",
            images.len(),
            limit
        );

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for (index, image) in images.into_iter().enumerate() {
            let service = Arc::clone(&self.service);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let response = service.identify(&encode_image(&image.bytes)).await;
                (index, RawIdentification { image, response })
            });
        }

        // 依完成順序收回，再還原成輸入順序
        let mut slots: Vec<Option<RawIdentification>> = Vec::new();
        slots.resize_with(tasks.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            let (index, identification) = joined.map_err(std::io::Error::from)?;
            if let Err(e) = &identification.response {
                tracing::warn!("⚠️ Identification failed for {}: {}", identification.image.name, e);
            }
            slots[index] = Some(identification);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    async fn transform(&self, identifications: Vec<RawIdentification>) -> Result<DiagnosisBatch> {
        let include_images = self.config.include_images();
        let mut entries = Vec::with_capacity(identifications.len());
        let mut reports = Vec::new();
        let mut used_names = HashSet::new();

        for RawIdentification { image, response } in identifications {
            let outcome = match response {
                Ok(raw) => {
                    let result = normalize(&raw);
                    let stem = unique_name(&mut used_names, &image.stem());
                    reports.push(NamedReport {
                        file_name: format!("reports/{}.txt", stem),
                        content: render_text_report(&result, Some(&image)),
                    });
                    EntryOutcome::Analyzed { result }
                }
                Err(e) => EntryOutcome::TransportError {
                    error: e.to_string(),
                },
            };

            entries.push(BatchEntry {
                image: image.name.clone(),
                outcome,
                source: include_images.then_some(image),
            });
        }

        let summary_csv = summary_csv(&entries)?;
        tracing::debug!("Rendered {} reports", reports.len());

        Ok(DiagnosisBatch {
            entries,
            summary_csv,
            reports,
        })
    }

    async fn load(&self, batch: DiagnosisBatch) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);
        tracing::info!("💾 Writing report archive: {}", output_path);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("results.json", FileOptions::default())?;
            let json_data = serde_json::to_string_pretty(&batch.entries)?;
            zip.write_all(json_data.as_bytes())?;

            zip.start_file::<_, ()>("summary.csv", FileOptions::default())?;
            zip.write_all(batch.summary_csv.as_bytes())?;

            for report in &batch.reports {
                zip.start_file::<_, ()>(report.file_name.as_str(), FileOptions::default())?;
                zip.write_all(report.content.as_bytes())?;
            }

            // 原始圖片 (include_images)
            let mut used_names = HashSet::new();
            for image in batch.entries.iter().filter_map(|e| e.source.as_ref()) {
                let name = unique_name(&mut used_names, &image.file_name());
                zip.start_file::<_, ()>(format!("images/{}", name), FileOptions::default())?;
                zip.write_all(&image.bytes)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.sink.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlConfig;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DiagnosisError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    /// 依圖片內容回應；"broken" 模擬 HTTP 失敗
    #[derive(Default)]
    struct ScriptedService {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl IdentificationService for ScriptedService {
        async fn identify(&self, encoded_image: &str) -> Result<Value> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match encoded_image {
                e if e == encode_image(b"broken") => Err(DiagnosisError::TransportError {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
                e if e == encode_image(b"stone") => {
                    Ok(json!({"result": {"is_plant": {"binary": false}}}))
                }
                _ => Ok(json!({
                    "result": {
                        "is_plant": {"binary": true},
                        "classification": {"suggestions": [{
                            "name": "Solanum lycopersicum",
                            "details": {"common_names": ["tomato"]}
                        }]},
                        "is_healthy": {"binary": true, "probability": 0.93},
                        "disease": {"suggestions": []}
                    }
                })),
            }
        }
    }

    fn config(images: &[&str], concurrent: usize, include_images: bool) -> TomlConfig {
        let list = images
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");
        TomlConfig::from_toml_str(&format!(
            r#"
[service]
api_key = "test"

[batch]
images = [{}]
concurrent_requests = {}

[output]
path = "./out"
include_images = {}
"#,
            list, concurrent, include_images
        ))
        .unwrap()
    }

    async fn seeded_source(files: &[(&str, &str)]) -> MockStorage {
        let storage = MockStorage::new();
        for (name, data) in files {
            storage.put(name, data.as_bytes()).await;
        }
        storage
    }

    #[tokio::test]
    async fn test_extract_keeps_input_order_and_bounds_concurrency() {
        let names = ["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg"];
        let files: Vec<(&str, &str)> = names.iter().map(|n| (*n, "leaf")).collect();
        let source = seeded_source(&files).await;
        let pipeline = DiagnosisPipeline::new(
            source,
            MockStorage::new(),
            config(&names, 2, false),
            ScriptedService::default(),
        );

        let identifications = pipeline.extract().await.unwrap();

        let order: Vec<&str> = identifications.iter().map(|i| i.image.name.as_str()).collect();
        assert_eq!(order, names);
        assert!(pipeline.service.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_abort_batch() {
        let source =
            seeded_source(&[("a.jpg", "leaf"), ("b.jpg", "broken"), ("c.png", "stone")]).await;
        let pipeline = DiagnosisPipeline::new(
            source,
            MockStorage::new(),
            config(&["a.jpg", "b.jpg", "c.png"], 4, false),
            ScriptedService::default(),
        );

        let identifications = pipeline.extract().await.unwrap();
        let batch = pipeline.transform(identifications).await.unwrap();

        assert_eq!(batch.analyzed_count(), 2);
        assert_eq!(batch.transport_failures(), 1);
        assert!(matches!(
            batch.entries[1].outcome,
            EntryOutcome::TransportError { .. }
        ));
        assert_eq!(batch.entries[0].result().unwrap().plant_name(), "Tomato");
        assert_eq!(
            batch.entries[2].result().unwrap().disease_type().as_str(),
            "invalid_image"
        );

        let report_names: Vec<&str> = batch.reports.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(report_names, ["reports/a.txt", "reports/c.txt"]);
        assert_eq!(batch.summary_csv.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let source = seeded_source(&[("empty.jpg", "")]).await;
        let pipeline = DiagnosisPipeline::new(
            source,
            MockStorage::new(),
            config(&["empty.jpg"], 1, false),
            ScriptedService::default(),
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, DiagnosisError::ImageError { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_archive_with_images() {
        let source = seeded_source(&[("leaf.jpg", "leaf"), ("dir/leaf.png", "leaf")]).await;
        let sink = MockStorage::new();
        let pipeline = DiagnosisPipeline::new(
            source,
            sink.clone(),
            config(&["leaf.jpg", "dir/leaf.png"], 2, true),
            ScriptedService::default(),
        );

        let identifications = pipeline.extract().await.unwrap();
        let batch = pipeline.transform(identifications).await.unwrap();
        let output_path = pipeline.load(batch).await.unwrap();
        assert_eq!(output_path, "./out/diagnosis_report.zip");

        let data = sink.get_file("diagnosis_report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "images/leaf.jpg",
                "images/leaf.png",
                "reports/leaf.txt",
                "reports/leaf_2.txt",
                "results.json",
                "summary.csv",
            ]
        );

        let mut results = String::new();
        archive
            .by_name("results.json")
            .unwrap()
            .read_to_string(&mut results)
            .unwrap();
        let parsed: Value = serde_json::from_str(&results).unwrap();
        assert_eq!(parsed[0]["status"], "analyzed");
        assert_eq!(parsed[0]["result"]["disease_type"], "healthy");
    }
}
