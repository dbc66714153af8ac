//! The normalization → join → aggregation pipeline.
//!
//! Stages run in order over immutable in-memory snapshots: load raw tables,
//! clean each table independently, merge onto the Results spine, then
//! aggregate per-entity summaries. A stage failure aborts the run before any
//! output is produced.

pub mod aggregate;
pub mod clean;
pub mod coerce;
pub mod duration;
pub mod join;

use crate::config::DnfStatusCatalog;
use crate::error::Result;
use crate::loader::load_tables;
use crate::pipeline::aggregate::{
    aggregate_constructors, aggregate_drivers, ConstructorStats, DriverStats,
};
use crate::pipeline::clean::{
    clean_circuits, clean_constructors, clean_drivers, clean_laptimes, clean_pitstops,
    clean_qualifying, clean_races, clean_results, CleanTables,
};
use crate::pipeline::join::{merge_tables, MergedDataset, MergedResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Everything a downstream consumer can read: the denormalized per-result
/// dataset, the per-entity summary tables, and the cleaned snapshots
/// themselves (pit stops and lap times are only reachable here — they feed
/// consumers directly rather than the join).
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub tables: CleanTables,
    pub merged: MergedDataset,
    pub driver_stats: Vec<DriverStats>,
    pub constructor_stats: Vec<ConstructorStats>,
}

/// Paths of the artifacts written by a full run.
#[derive(Debug)]
pub struct WrittenArtifacts {
    pub merged: PathBuf,
    pub driver_stats: PathBuf,
    pub constructor_stats: PathBuf,
}

pub struct Pipeline {
    dnf_catalog: DnfStatusCatalog,
}

impl Pipeline {
    pub fn new(dnf_catalog: DnfStatusCatalog) -> Self {
        Self { dnf_catalog }
    }

    pub fn with_default_catalog() -> Self {
        Self::new(DnfStatusCatalog::default_catalog().clone())
    }

    /// Run every cleaner over the loaded snapshot. Optional tables that were
    /// not loaded stay absent; their cleaners are no-ops by construction.
    fn clean_all(&self, data_dir: &Path) -> Result<CleanTables> {
        let raw = load_tables(data_dir)?;
        Ok(CleanTables {
            races: clean_races(&raw.races),
            drivers: clean_drivers(&raw.drivers),
            constructors: clean_constructors(&raw.constructors),
            results: clean_results(&raw.results, &self.dnf_catalog),
            qualifying: raw.qualifying.as_deref().map(clean_qualifying),
            pitstops: raw.pitstops.as_deref().map(clean_pitstops),
            laptimes: raw.laptimes.as_deref().map(clean_laptimes),
            circuits: raw.circuits.as_deref().map(clean_circuits),
        })
    }

    /// Execute the full pipeline: load → clean → merge → aggregate.
    ///
    /// Fail-fast: the first stage error aborts the run and no partial output
    /// is ever returned.
    #[instrument(skip(self), fields(data_dir = %data_dir.display()))]
    pub fn run(&self, data_dir: &Path) -> Result<PipelineOutput> {
        let tables = self.clean_all(data_dir)?;
        let merged = merge_tables(&tables)?;
        let driver_stats = aggregate_drivers(&tables.results, &tables.drivers);
        let constructor_stats = aggregate_constructors(&tables.results, &tables.constructors);

        info!(
            merged_rows = merged.rows.len(),
            drivers = driver_stats.len(),
            constructors = constructor_stats.len(),
            "Pipeline run complete"
        );
        Ok(PipelineOutput {
            tables,
            merged,
            driver_stats,
            constructor_stats,
        })
    }
}

fn fmt_opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn merged_header(dataset: &MergedDataset) -> Vec<&'static str> {
    let mut header = vec![
        "resultId",
        "raceId",
        "year",
        "driverId",
        "constructorId",
        "grid",
        "position",
        "positionOrder",
        "points",
        "laps",
        "milliseconds",
        "status",
        "is_dnf",
        "position_change",
        "round",
        "circuitId",
        "race_name",
        "date",
        "driver",
        "driver_nationality",
        "driver_code",
        "constructor_name",
        "constructor_nationality",
    ];
    if dataset.has_circuits {
        header.extend(["circuit_name", "circuit_country", "circuit_lat", "circuit_lng"]);
    }
    if dataset.has_qualifying {
        header.extend(["qualifying_position", "q1_seconds", "q2_seconds", "q3_seconds"]);
    }
    header
}

fn merged_record(dataset: &MergedDataset, row: &MergedResult) -> Vec<String> {
    let mut record = vec![
        fmt_opt(&row.result_id),
        fmt_opt(&row.race_id),
        fmt_opt(&row.year),
        fmt_opt(&row.driver_id),
        fmt_opt(&row.constructor_id),
        fmt_opt(&row.grid),
        fmt_opt(&row.position),
        fmt_opt(&row.position_order),
        fmt_opt(&row.points),
        fmt_opt(&row.laps),
        fmt_opt(&row.milliseconds),
        fmt_opt(&row.status),
        row.is_dnf.to_string(),
        fmt_opt(&row.position_change),
        fmt_opt(&row.round),
        fmt_opt(&row.circuit_id),
        fmt_opt(&row.race_name),
        fmt_opt(&row.race_date),
        fmt_opt(&row.driver),
        fmt_opt(&row.driver_nationality),
        fmt_opt(&row.driver_code),
        fmt_opt(&row.constructor_name),
        fmt_opt(&row.constructor_nationality),
    ];
    if dataset.has_circuits {
        record.extend([
            fmt_opt(&row.circuit_name),
            fmt_opt(&row.circuit_country),
            fmt_opt(&row.circuit_lat),
            fmt_opt(&row.circuit_lng),
        ]);
    }
    if dataset.has_qualifying {
        record.extend([
            fmt_opt(&row.qualifying_position),
            fmt_opt(&row.q1_seconds),
            fmt_opt(&row.q2_seconds),
            fmt_opt(&row.q3_seconds),
        ]);
    }
    record
}

impl PipelineOutput {
    /// Persist the output artifacts as flat CSV files. Column groups for
    /// optional tables that were not loaded are omitted from the merged file.
    pub fn write_csv(&self, output_dir: &Path) -> Result<WrittenArtifacts> {
        fs::create_dir_all(output_dir)?;

        let merged_path = output_dir.join("merged_results.csv");
        let mut writer = csv::Writer::from_path(&merged_path)?;
        writer.write_record(merged_header(&self.merged))?;
        for row in &self.merged.rows {
            writer.write_record(merged_record(&self.merged, row))?;
        }
        writer.flush()?;

        let driver_path = output_dir.join("driver_stats.csv");
        let mut writer = csv::Writer::from_path(&driver_path)?;
        for stats in &self.driver_stats {
            writer.serialize(stats)?;
        }
        writer.flush()?;

        let constructor_path = output_dir.join("constructor_stats.csv");
        let mut writer = csv::Writer::from_path(&constructor_path)?;
        for stats in &self.constructor_stats {
            writer.serialize(stats)?;
        }
        writer.flush()?;

        info!(output_dir = %output_dir.display(), "Output artifacts written");
        Ok(WrittenArtifacts {
            merged: merged_path,
            driver_stats: driver_path,
            constructor_stats: constructor_path,
        })
    }
}
