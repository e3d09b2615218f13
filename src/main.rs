use clap::Parser;
use leaf_diagnosis::utils::{logger, validation::Validate};
use leaf_diagnosis::{CliConfig, DiagnosisEngine, DiagnosisPipeline, LocalStorage, PlantIdClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting leaf-diagnosis CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let client = match PlantIdClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.severity().exit_code());
        }
    };

    // 來源目錄讀圖，輸出目錄寫報告
    let source = LocalStorage::new(config.input_dir.clone());
    let sink = LocalStorage::new(config.output_path.clone());
    let pipeline = DiagnosisPipeline::new(source, sink, config, client);
    let engine = DiagnosisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Diagnosis completed: {} images analyzed", summary.analyzed);
            println!("✅ Diagnosis completed: {} images analyzed", summary.analyzed);
            println!("📁 Reports saved to: {}", summary.output_path);

            if summary.transport_failures > 0 {
                tracing::warn!(
                    "⚠️ {} images could not be identified",
                    summary.transport_failures
                );
                eprintln!(
                    "⚠️ {} images could not be identified, see summary.csv",
                    summary.transport_failures
                );
                std::process::exit(2);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Diagnosis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
