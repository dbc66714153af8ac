//! Join engine: enrich the Results spine with race, driver, constructor,
//! circuit and qualifying context via key-based left joins.
//!
//! The primary correctness invariant is row-count preservation: the merged
//! dataset has exactly one row per cleaned result. Joins are hash lookups
//! against reference indexes, and a duplicate key discovered while building
//! an index is the cardinality violation that would otherwise multiply rows,
//! so it fails the run instead.

use crate::error::{PipelineError, Result};
use crate::pipeline::clean::{CleanTables, Qualifying};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, info};

/// One denormalized row: a cleaned result plus every enrichment column.
/// Enrichments from absent or unmatched reference rows are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResult {
    // Spine columns from the cleaned result row
    pub result_id: Option<i64>,
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub driver_id: Option<String>,
    pub constructor_id: Option<String>,
    pub grid: Option<i64>,
    pub position: Option<i64>,
    pub position_order: Option<i64>,
    pub points: Option<f64>,
    pub laps: Option<i64>,
    pub milliseconds: Option<i64>,
    pub status: Option<String>,
    pub is_dnf: bool,
    pub position_change: Option<i64>,

    // Race enrichment
    pub round: Option<i64>,
    pub circuit_id: Option<String>,
    pub race_name: Option<String>,
    pub race_date: Option<NaiveDate>,

    // Driver enrichment
    pub driver: Option<String>,
    pub driver_nationality: Option<String>,
    pub driver_code: Option<String>,

    // Constructor enrichment
    pub constructor_name: Option<String>,
    pub constructor_nationality: Option<String>,

    // Circuit enrichment
    pub circuit_name: Option<String>,
    pub circuit_country: Option<String>,
    pub circuit_lat: Option<f64>,
    pub circuit_lng: Option<f64>,

    // Qualifying enrichment
    pub qualifying_position: Option<i64>,
    pub q1_seconds: Option<f64>,
    pub q2_seconds: Option<f64>,
    pub q3_seconds: Option<f64>,
}

/// The denormalized dataset handed to downstream consumers.
///
/// `has_circuits` / `has_qualifying` record which optional enrichments were
/// actually loaded; the CSV writer omits those column groups entirely when
/// the source table was absent.
#[derive(Debug, Clone)]
pub struct MergedDataset {
    pub rows: Vec<MergedResult>,
    pub has_circuits: bool,
    pub has_qualifying: bool,
}

/// Build a unique-key index over a reference table. A key that maps to more
/// than one row is fatal: looked up from the spine it would silently
/// multiply result rows and corrupt every downstream aggregate.
fn build_unique_index<'a, T, K, F>(
    rows: &'a [T],
    table: &'static str,
    key_fn: F,
) -> Result<HashMap<K, &'a T>>
where
    K: Eq + Hash + Debug,
    F: Fn(&T) -> Option<K>,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        // Rows with a missing key can never match the spine; skip them
        let Some(key) = key_fn(row) else { continue };
        if index.contains_key(&key) {
            return Err(PipelineError::JoinCardinality {
                table,
                key: format!("{:?}", key),
                count: 2,
            });
        }
        index.insert(key, row);
    }
    Ok(index)
}

/// Collapse qualifying entries to at most one per (raceId, year, driverId),
/// keeping the first entry in original file order. This is what guarantees
/// the qualifying join cannot multiply result rows.
fn aggregate_qualifying(rows: &[Qualifying]) -> HashMap<(i64, i64, String), &Qualifying> {
    let mut index: HashMap<(i64, i64, String), &Qualifying> = HashMap::new();
    for row in rows {
        let (Some(race_id), Some(year), Some(driver_id)) =
            (row.race_id, row.year, row.driver_id.as_ref())
        else {
            continue;
        };
        index.entry((race_id, year, driver_id.clone())).or_insert(row);
    }
    index
}

/// Left-join the cleaned reference tables onto the Results spine.
///
/// Join order: races (raceId, year) → drivers (driverId) → constructors
/// (constructorId) → circuits (circuitId from the race join) → aggregated
/// qualifying (raceId, year, driverId). Absent optional tables are skipped.
pub fn merge_tables(tables: &CleanTables) -> Result<MergedDataset> {
    info!("Merging data tables");

    let races = build_unique_index(&tables.races, "races", |r| {
        Some((r.race_id?, r.year?))
    })?;
    let drivers = build_unique_index(&tables.drivers, "drivers", |d| d.driver_id.clone())?;
    let constructors =
        build_unique_index(&tables.constructors, "constructors", |c| {
            c.constructor_id.clone()
        })?;
    let circuits = match &tables.circuits {
        Some(rows) => Some(build_unique_index(rows, "circuits", |c| c.circuit_id.clone())?),
        None => None,
    };
    let qualifying = tables
        .qualifying
        .as_deref()
        .map(aggregate_qualifying);

    let spine_len = tables.results.len();
    let mut rows = Vec::with_capacity(spine_len);

    for result in &tables.results {
        let race = match (result.race_id, result.year) {
            (Some(race_id), Some(year)) => races.get(&(race_id, year)).copied(),
            _ => None,
        };
        let driver = result
            .driver_id
            .as_ref()
            .and_then(|id| drivers.get(id).copied());
        let constructor = result
            .constructor_id
            .as_ref()
            .and_then(|id| constructors.get(id).copied());
        let circuit_id = race.and_then(|r| r.circuit_id.clone());
        let circuit = match (&circuits, &circuit_id) {
            (Some(index), Some(id)) => index.get(id).copied(),
            _ => None,
        };
        let qual = match (&qualifying, result.race_id, result.year, &result.driver_id) {
            (Some(index), Some(race_id), Some(year), Some(driver_id)) => index
                .get(&(race_id, year, driver_id.clone()))
                .copied(),
            _ => None,
        };

        rows.push(MergedResult {
            result_id: result.result_id,
            race_id: result.race_id,
            year: result.year,
            driver_id: result.driver_id.clone(),
            constructor_id: result.constructor_id.clone(),
            grid: result.grid,
            position: result.position,
            position_order: result.position_order,
            points: result.points,
            laps: result.laps,
            milliseconds: result.milliseconds,
            status: result.status.clone(),
            is_dnf: result.is_dnf,
            position_change: result.position_change,

            round: race.and_then(|r| r.round),
            circuit_id,
            race_name: race.and_then(|r| r.name.clone()),
            race_date: race.and_then(|r| r.date),

            driver: driver.map(|d| d.full_name.clone()),
            driver_nationality: driver.and_then(|d| d.nationality.clone()),
            driver_code: driver.and_then(|d| d.code.clone()),

            constructor_name: constructor.and_then(|c| c.name.clone()),
            constructor_nationality: constructor.and_then(|c| c.nationality.clone()),

            circuit_name: circuit.and_then(|c| c.name.clone()),
            circuit_country: circuit.and_then(|c| c.country.clone()),
            circuit_lat: circuit.and_then(|c| c.lat),
            circuit_lng: circuit.and_then(|c| c.lng),

            qualifying_position: qual.and_then(|q| q.position),
            q1_seconds: qual.and_then(|q| q.q1_seconds),
            q2_seconds: qual.and_then(|q| q.q2_seconds),
            q3_seconds: qual.and_then(|q| q.q3_seconds),
        });
    }

    debug_assert_eq!(rows.len(), spine_len);
    debug!(rows = rows.len(), "Merged dataset assembled");

    Ok(MergedDataset {
        rows,
        has_circuits: tables.circuits.is_some(),
        has_qualifying: tables.qualifying.is_some(),
    })
}
