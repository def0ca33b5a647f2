use clap::Parser;
use food_order_stats::utils::error::{AnalysisError, ErrorSeverity};
use food_order_stats::utils::{logger, validation::Validate};
use food_order_stats::{AnalysisEngine, AnalysisPipeline, CliConfig, LocalStorage, OrderSource};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting food-order-stats");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let source = OrderSource::from_config(&config);
    let storage = LocalStorage::new(config.output_path.clone());
    let monitor = config.monitor;
    let pipeline = AnalysisPipeline::new(source, storage, config);

    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ Analyzed {} orders, results in {}",
                summary.record_count, summary.output
            );
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}

fn report_failure(e: &AnalysisError) -> i32 {
    tracing::error!(
        "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
