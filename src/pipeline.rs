//! End-to-end run: load, build the star schema, compute KPIs and analyses,
//! write everything under one output directory.
//!
//! Each stage consumes the previous stage's immutable result. No stage reads
//! the wall clock, so identical input and config produce identical files.

use crate::analysis::{self, RushHourAnalysis, SummaryReport, WeatherAnalysis, WeekendAnalysis};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::kpi::KpiCatalog;
use crate::loader::load_rides;
use crate::model::RideRecord;
use crate::output::{self, DATA_MODEL_DIR, INSIGHTS_DIR};
use crate::schema::StarSchema;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything derived from one ride table, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub schema: StarSchema,
    pub kpis: KpiCatalog,
    pub rush_hour: RushHourAnalysis,
    pub weekend: WeekendAnalysis,
    pub weather: WeatherAnalysis,
}

impl Analysis {
    /// Builds the schema and every aggregate. Fails on an empty ride table.
    pub fn compute(rides: &[RideRecord], config: &PipelineConfig) -> Result<Self> {
        if rides.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let schema = StarSchema::build(rides, config);
        let kpis = KpiCatalog::compute(&schema.fact, config);

        Ok(Analysis {
            rush_hour: analysis::rush_hour::analyze(&schema.fact, config),
            weekend: analysis::weekend::analyze(&schema.fact),
            weather: analysis::weather::analyze(&schema.fact),
            kpis,
            schema,
        })
    }

    pub fn summary(&self, config: &PipelineConfig) -> SummaryReport<'_> {
        SummaryReport::new(&self.schema.fact, &self.kpis, config)
    }

    /// Writes the workbook and the insight documents under `output_dir`.
    #[tracing::instrument(skip_all, fields(output_dir = %output_dir.display()))]
    pub fn write(&self, output_dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
        let mut files = output::write_workbook(&self.schema, &output_dir.join(DATA_MODEL_DIR))?;

        let insights = output_dir.join(INSIGHTS_DIR);
        output::ensure_dir(&insights)?;

        let summary = self.summary(config);
        let documents = [
            ("all_kpis.json", serde_json::to_value(&self.kpis)),
            ("rush_hour_analysis.json", serde_json::to_value(&self.rush_hour)),
            ("weekend_analysis.json", serde_json::to_value(&self.weekend)),
            ("weather_analysis.json", serde_json::to_value(&self.weather)),
            ("summary_report.json", serde_json::to_value(&summary)),
        ];
        for (name, document) in documents {
            let path = insights.join(name);
            let document = document.map_err(|e| PipelineError::OutputWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;
            output::write_json(&path, &document)?;
            files.push(path);
        }

        let markdown = insights.join("summary.md");
        output::write_text(&markdown, &summary.to_markdown())?;
        files.push(markdown);

        info!(files = files.len(), "Outputs written");
        Ok(files)
    }
}

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub analysis: Analysis,
    pub files: Vec<PathBuf>,
}

/// Loads `input`, computes the analysis and writes it under `output_dir`.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub fn run(input: &Path, output_dir: &Path, config: &PipelineConfig) -> Result<PipelineOutput> {
    let rides = load_rides(input)?;
    let analysis = Analysis::compute(&rides, config)?;

    let orphans = analysis.schema.orphan_keys();
    if !orphans.is_empty() {
        warn!(count = orphans.len(), "Schema has unresolved foreign keys");
    }

    let files = analysis.write(output_dir, config)?;
    info!(
        rides = rides.len(),
        total_revenue = analysis.kpis.revenue.total_revenue,
        "Pipeline finished"
    );

    Ok(PipelineOutput { analysis, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_support::ride;

    fn rides() -> Vec<RideRecord> {
        vec![
            ride("R1", 8, 100.0, 120.0, 10.0),
            ride("R2", 14, 100.0, 100.0, 5.0),
            ride("R3", 18, 50.0, 90.0, 0.0),
        ]
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = Analysis::compute(&[], &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn test_revenue_matches_fact_sum() {
        let analysis = Analysis::compute(&rides(), &PipelineConfig::default()).unwrap();
        let fact_sum: f64 = analysis.schema.fact.iter().map(|r| r.final_price).sum();
        assert_eq!(analysis.kpis.revenue.total_revenue, fact_sum);
        assert_eq!(analysis.kpis.temporal.rush_hour_split.rush.trips, 2);
    }

    #[test]
    fn test_write_produces_full_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let analysis = Analysis::compute(&rides(), &config).unwrap();
        let files = analysis.write(dir.path(), &config).unwrap();

        assert_eq!(files.len(), 14);
        assert!(dir.path().join("data_model/FactRides.csv").exists());
        assert!(dir.path().join("insights/all_kpis.json").exists());
        assert!(dir.path().join("insights/summary.md").exists());
    }
}
