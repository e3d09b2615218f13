use clap::Parser;
use leaf_diagnosis::core::ConfigProvider;
use leaf_diagnosis::utils::{logger, validation::Validate};
use leaf_diagnosis::{DiagnosisEngine, DiagnosisPipeline, LocalStorage, PlantIdClient, TomlConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-diagnose")]
#[command(about = "Leaf diagnosis batch driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "diagnose.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - list the images that would be sent without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based leaf diagnosis");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 沒列出圖片時掃描 input_dir
    if let Err(e) = config.discover_images() {
        eprintln!("❌ Could not scan '{}': {}", config.input_dir(), e);
        std::process::exit(e.severity().exit_code());
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config);
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
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

    let source = LocalStorage::new(config.input_dir().to_string());
    let sink = LocalStorage::new(config.output_path().to_string());
    let pipeline = DiagnosisPipeline::new(source, sink, config, client);
    let engine = DiagnosisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Diagnosis completed: {} images analyzed", summary.analyzed);
            println!("✅ Diagnosis completed: {} images analyzed", summary.analyzed);
            println!("📁 Reports saved to: {}", summary.output_path);

            if summary.transport_failures > 0 {
                eprintln!(
                    "⚠️ {} images could not be identified, see summary.csv",
                    summary.transport_failures
                );
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Diagnosis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Endpoint: {}", config.api_endpoint());
    println!("  Language: {}", config.language());
    println!("  Input: {} ({} images)", config.input_dir(), config.images().len());
    println!("  Output: {}/{}", config.output_path(), config.archive_name());
    println!("  Concurrent Requests: {}", config.concurrent_requests());
    println!("  Timeout: {}s", config.timeout_seconds());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🌿 Images:");
    let mut missing = 0;
    for name in config.images() {
        let path = Path::new(config.input_dir()).join(name);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => println!("  ✅ {} ({} bytes)", name, meta.len()),
            Ok(_) => {
                missing += 1;
                println!("  ❌ {} (empty file)", name);
            }
            Err(_) => {
                missing += 1;
                println!("  ❌ {} (not found)", name);
            }
        }
    }

    println!();
    println!("💾 Archive contents:");
    println!("  results.json, summary.csv, reports/<image>.txt");
    if config.include_images() {
        println!("  images/<image> (source photos included)");
    }

    println!();
    if missing > 0 {
        println!("⚠️ {} images would fail to load. Fix them before a real run.", missing);
    } else {
        println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
    }
}
