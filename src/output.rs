//! Persistence for the star schema and the analysis documents.
//!
//! Tables are written as one CSV sheet per table into the data-model
//! directory; analysis results are pretty-printed JSON. Every file is
//! truncated on write, so re-running over the same input reproduces the
//! same bytes.

use crate::error::{PipelineError, Result};
use crate::schema::StarSchema;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATA_MODEL_DIR: &str = "data_model";
pub const INSIGHTS_DIR: &str = "insights";
pub const DOCUMENTATION_FILE: &str = "data_model_documentation.json";

pub const FACT_TABLE: &str = "FactRides";

fn write_error(path: &Path, err: impl Display) -> PipelineError {
    PipelineError::OutputWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| write_error(dir, e))
}

/// Writes `rows` as a CSV sheet with a header row, replacing any existing file.
pub fn write_sheet<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row).map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;

    debug!(path = %path.display(), rows = rows.len(), "Sheet written");
    Ok(())
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| write_error(path, e))?;
    write_text(path, &json)
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| write_error(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "File written");
    Ok(())
}

/// Writes every table of `schema` into `dir`, one sheet per table, followed
/// by the data model documentation. Returns the written paths.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_workbook(schema: &StarSchema, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let sheet = |name: &str| dir.join(format!("{name}.csv"));
    let paths = vec![
        sheet(FACT_TABLE),
        sheet("DimTime"),
        sheet("DimHour"),
        sheet("DimVehicle"),
        sheet("DimWeather"),
        sheet("DimRoute"),
        sheet("DimLocation"),
        dir.join(DOCUMENTATION_FILE),
    ];

    write_sheet(&paths[0], &schema.fact)?;
    write_sheet(&paths[1], &schema.time)?;
    write_sheet(&paths[2], &schema.hour)?;
    write_sheet(&paths[3], &schema.vehicle)?;
    write_sheet(&paths[4], &schema.weather)?;
    write_sheet(&paths[5], &schema.route)?;
    write_sheet(&paths[6], &schema.location)?;
    write_json(&paths[7], &DataModelDocumentation::describe(schema))?;

    info!(files = paths.len(), "Workbook written");
    Ok(paths)
}

/// Machine-readable description of the star schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataModelDocumentation {
    pub schema_type: &'static str,
    pub fact_table: &'static str,
    pub dimension_tables: Vec<&'static str>,
    pub tables: BTreeMap<&'static str, TableDoc>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDoc {
    pub description: &'static str,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub from_table: &'static str,
    pub from_column: &'static str,
    pub to_table: &'static str,
    pub to_column: &'static str,
    pub cardinality: &'static str,
}

/// Fact foreign key, dimension table, dimension key.
const RELATIONSHIPS: [(&str, &str, &str); 5] = [
    ("date", "DimTime", "date"),
    ("hour", "DimHour", "hour"),
    ("vehicle_type", "DimVehicle", "vehicle_type"),
    ("weather_condition", "DimWeather", "weather_condition"),
    ("location_route_id", "DimRoute", "location_route_id"),
];

impl DataModelDocumentation {
    pub fn describe(schema: &StarSchema) -> Self {
        let tables = BTreeMap::from([
            (
                FACT_TABLE,
                table_doc("One row per completed ride with keys and measures", &schema.fact),
            ),
            (
                "DimTime",
                table_doc("Calendar attributes for every date in the observed range", &schema.time),
            ),
            ("DimHour", table_doc("Attributes of each hour of the day", &schema.hour)),
            (
                "DimVehicle",
                table_doc("Vehicle categories and their fixed profiles", &schema.vehicle),
            ),
            ("DimWeather", table_doc("One row per weather condition", &schema.weather)),
            (
                "DimRoute",
                table_doc("Origin and destination pairs with trip aggregates", &schema.route),
            ),
            (
                "DimLocation",
                table_doc("Every origin or destination with a keyword category", &schema.location),
            ),
        ]);

        DataModelDocumentation {
            schema_type: "Star Schema",
            fact_table: FACT_TABLE,
            dimension_tables: vec![
                "DimTime",
                "DimHour",
                "DimVehicle",
                "DimWeather",
                "DimRoute",
                "DimLocation",
            ],
            tables,
            relationships: RELATIONSHIPS
                .iter()
                .map(|&(from_column, to_table, to_column)| Relationship {
                    from_table: FACT_TABLE,
                    from_column,
                    to_table,
                    to_column,
                    cardinality: "many-to-one",
                })
                .collect(),
        }
    }
}

fn table_doc<T: Serialize>(description: &'static str, rows: &[T]) -> TableDoc {
    TableDoc {
        description,
        rows: rows.len(),
        columns: column_names(rows),
    }
}

/// Column headers a sheet of `rows` would carry, in field order.
fn column_names<T: Serialize>(rows: &[T]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    if writer.serialize(first).is_err() {
        return Vec::new();
    }
    let bytes = writer.into_inner().unwrap_or_default();

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
    reader
        .headers()
        .map(|h| h.iter().map(str::to_string).collect())
        .unwrap_or_default()
}
