use ride_star::config::PipelineConfig;
use ride_star::error::PipelineError;
use ride_star::kpi::Measure;
use ride_star::model::WeatherCondition;
use ride_star::pipeline;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rides.csv")
}

#[test]
fn test_full_pipeline() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default())
        .expect("pipeline should succeed on the fixture");
    let analysis = &output.analysis;

    assert_eq!(analysis.schema.fact.len(), 14);
    // 9 March through 8 April inclusive
    assert_eq!(analysis.schema.time.len(), 31);
    assert_eq!(analysis.schema.hour.len(), 24);
    assert_eq!(analysis.schema.vehicle.len(), 3);
    assert_eq!(analysis.schema.route.len(), 11);
    assert_eq!(analysis.schema.location.len(), 6);

    for file in &output.files {
        assert!(file.exists(), "{} missing", file.display());
    }
    assert!(out.path().join("insights/summary.md").exists());
}

#[test]
fn test_total_revenue_matches_fact_sum() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default()).unwrap();
    let analysis = &output.analysis;

    let fact_sum: f64 = analysis.schema.fact.iter().map(|r| r.final_price).sum();
    assert_eq!(analysis.kpis.revenue.total_revenue, fact_sum);
    assert_eq!(fact_sum, 2292.5);

    let kpi_path = out.path().join("insights/all_kpis.json");
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(kpi_path).unwrap()).unwrap();
    assert_eq!(written["total_revenue"], 2292.5);
    assert_eq!(written["total_trip_volume"], 14);
}

#[test]
fn test_weather_dimension_one_row_per_condition() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default()).unwrap();
    let schema = &output.analysis.schema;

    let conditions: HashSet<_> = schema.fact.iter().map(|r| r.weather_condition.clone()).collect();
    assert_eq!(schema.weather.len(), conditions.len());

    let rain = schema
        .weather
        .iter()
        .find(|w| w.weather_condition == WeatherCondition::Rain)
        .unwrap();
    assert_eq!(rain.weather_description, "light rain");
    assert_eq!(rain.description_variants, 3);

    let sheet = fs::read_to_string(out.path().join("data_model/DimWeather.csv")).unwrap();
    assert_eq!(sheet.lines().count(), conditions.len() + 1);
}

#[test]
fn test_referential_completeness() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default()).unwrap();
    assert!(output.analysis.schema.orphan_keys().is_empty());
}

#[test]
fn test_rerun_is_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();

    let a = pipeline::run(&fixture(), first.path(), &config).unwrap();
    let b = pipeline::run(&fixture(), second.path(), &config).unwrap();
    assert_eq!(a.files.len(), b.files.len());

    for file in &a.files {
        let relative = file.strip_prefix(first.path()).unwrap();
        let left = fs::read(file).unwrap();
        let right = fs::read(second.path().join(relative)).unwrap();
        assert_eq!(left, right, "{} differs between runs", relative.display());
    }
}

#[test]
fn test_rerun_into_same_directory_overwrites() {
    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();

    pipeline::run(&fixture(), out.path(), &config).unwrap();
    let before = fs::read(out.path().join("data_model/FactRides.csv")).unwrap();
    pipeline::run(&fixture(), out.path(), &config).unwrap();
    let after = fs::read(out.path().join("data_model/FactRides.csv")).unwrap();

    assert_eq!(before, after);
}

#[test]
fn test_zero_distance_ride_written_as_not_applicable() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default()).unwrap();

    let r009 = output
        .analysis
        .schema
        .fact
        .iter()
        .find(|r| r.ride_id == "R009")
        .unwrap();
    assert_eq!(r009.price_per_km, Measure::Undefined);

    let sheet = fs::read_to_string(out.path().join("data_model/FactRides.csv")).unwrap();
    let row = sheet.lines().find(|l| l.starts_with("R009,")).unwrap();
    assert!(row.contains("not_applicable"));
}

#[test]
fn test_missing_columns_fail_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rides.csv");
    fs::write(&input, "ride_id,datetime,hour\nR1,2024-03-11 08:00:00,8\n").unwrap();
    let out = dir.path().join("out");

    match pipeline::run(&input, &out, &PipelineConfig::default()) {
        Err(PipelineError::MissingColumns(missing)) => {
            assert!(missing.contains(&"final_price".to_string()));
            assert!(missing.contains(&"weather_condition".to_string()));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_header_only_input_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rides.csv");
    let header = fs::read_to_string(fixture())
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    fs::write(&input, header).unwrap();

    let err =
        pipeline::run(&input, &dir.path().join("out"), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput));
}

#[test]
fn test_config_changes_point_of_interest() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"point_of_interest": "CMC"}"#).unwrap();
    let config = PipelineConfig::load(&config_path).unwrap();

    let output = pipeline::run(&fixture(), &dir.path().join("out"), &config).unwrap();
    let poi = &output.analysis.kpis.geographic.poi_performance;
    assert_eq!(poi.point_of_interest, "CMC");
    assert_eq!(poi.total_trips, 3);
}

#[test]
fn test_rush_hour_analysis_windows() {
    let out = tempfile::tempdir().unwrap();
    let output = pipeline::run(&fixture(), out.path(), &PipelineConfig::default()).unwrap();
    let rush = &output.analysis.rush_hour;

    // hours 8 and 9
    assert_eq!(rush.morning_rush.total_trips, 5);
    // hours 17 and 18
    assert_eq!(rush.evening_rush.total_trips, 4);
}
