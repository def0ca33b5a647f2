use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::{PhaseTiming, RunMonitor};

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: String,
    pub record_count: usize,
    pub phases: Vec<PhaseTiming>,
}

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitoring: bool,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitoring: bool) -> Self {
        Self {
            pipeline,
            monitoring,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let mut monitor = RunMonitor::new(self.monitoring);
        tracing::info!("🚀 Starting order analysis");

        monitor.start_phase();
        let records = self.pipeline.extract().await?;
        let record_count = records.len();
        tracing::info!("📊 Extracted {} order records", record_count);
        monitor.end_phase("extract");

        let bundle = self.pipeline.transform(records).await?;
        tracing::info!(
            "🔧 Aggregated {} cities, {} cuisines, {} high-value customers",
            bundle.orders_per_city.len(),
            bundle.cuisine_popularity.len(),
            bundle.high_value_customers.len()
        );
        monitor.end_phase("transform");

        let output = self.pipeline.load(bundle).await?;
        tracing::info!("💾 Results written to {}", output);
        monitor.end_phase("load");

        monitor.log_final_stats();

        Ok(RunSummary {
            output,
            record_count,
            phases: monitor.phases().to_vec(),
        })
    }
}
