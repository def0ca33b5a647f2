use clap::Parser;
use food_order_stats::core::ConfigProvider;
use food_order_stats::utils::error::ErrorSeverity;
use food_order_stats::utils::{logger, validation::Validate};
use food_order_stats::{AnalysisEngine, AnalysisPipeline, LocalStorage, OrderSource, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-analyze")]
#[command(about = "Food order analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "analysis.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the source location from config
    #[arg(long)]
    input: Option<String>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_cli_logger(verbose);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 命令列覆蓋設定
    if let Some(input) = &args.input {
        config.source.location = input.clone();
        tracing::info!("🔧 Source overridden to: {}", input);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AnalysisPipeline::new(source, storage, config);
    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Analysis completed: {} orders", summary.record_count);
            println!("📁 Output saved to: {}", summary.output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let settings = config.analysis_settings();

    println!("📋 Configuration Summary:");
    println!("  Analysis: {}", config.analysis.name);
    if let Some(description) = &config.analysis.description {
        println!("  Description: {}", description);
    }
    println!("  Source: {}", config.input_location());
    println!("  Delimiter: {:?}", config.delimiter() as char);
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if let Some(archive) = config.archive_filename() {
        println!("  Archive: {} (ZIP)", archive);
    }
    println!("  Top restaurants: {}", settings.top_restaurants);
    println!("  High-value threshold: > {}", settings.high_value_threshold);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
