//! Aggregation engine: per-driver and per-constructor summary tables
//! computed from the cleaned Results spine.
//!
//! Rates always use the entity's own race count as the denominator. A group
//! only exists because at least one result row produced it, so the
//! denominator is structurally non-zero.

use crate::pipeline::clean::{Constructor, Driver, ResultRow};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    races: u64,
    wins: u64,
    podiums: u64,
    total_points: f64,
    dnfs: u64,
    position_change_sum: i64,
    position_change_count: u64,
}

impl GroupAccumulator {
    fn add(&mut self, row: &ResultRow) {
        self.races += 1;
        if row.position == Some(1) {
            self.wins += 1;
        }
        if matches!(row.position, Some(p) if p <= 3) {
            self.podiums += 1;
        }
        if let Some(points) = row.points {
            self.total_points += points;
        }
        if row.is_dnf {
            self.dnfs += 1;
        }
        if let Some(change) = row.position_change {
            self.position_change_sum += change;
            self.position_change_count += 1;
        }
    }

    fn avg_position_change(&self) -> Option<f64> {
        if self.position_change_count == 0 {
            return None;
        }
        Some(self.position_change_sum as f64 / self.position_change_count as f64)
    }
}

/// Summary statistics for one driver that appears in Results.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStats {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    pub races: u64,
    pub wins: u64,
    pub podiums: u64,
    pub total_points: f64,
    pub dnfs: u64,
    pub avg_position_change: Option<f64>,
    /// Display name from the drivers reference table; missing when the
    /// driver has no reference row.
    pub full_name: Option<String>,
    pub win_rate: f64,
    pub podium_rate: f64,
    pub dnf_rate: f64,
}

/// Summary statistics for one constructor that appears in Results.
#[derive(Debug, Clone, Serialize)]
pub struct ConstructorStats {
    #[serde(rename = "constructorId")]
    pub constructor_id: String,
    pub races: u64,
    pub wins: u64,
    pub podiums: u64,
    pub total_points: f64,
    pub dnfs: u64,
    pub name: Option<String>,
    pub win_rate: f64,
    pub podium_rate: f64,
}

/// Group results by driver, attaching the display name from the drivers
/// reference table. Output order is deterministic (sorted by driverId).
pub fn aggregate_drivers(results: &[ResultRow], drivers: &[Driver]) -> Vec<DriverStats> {
    let names: HashMap<&str, &str> = drivers
        .iter()
        .filter_map(|d| Some((d.driver_id.as_deref()?, d.full_name.as_str())))
        .collect();

    let mut groups: HashMap<&str, GroupAccumulator> = HashMap::new();
    for row in results {
        let Some(driver_id) = row.driver_id.as_deref() else {
            continue;
        };
        groups.entry(driver_id).or_default().add(row);
    }

    let mut stats: Vec<DriverStats> = groups
        .into_iter()
        .map(|(driver_id, acc)| DriverStats {
            driver_id: driver_id.to_string(),
            races: acc.races,
            wins: acc.wins,
            podiums: acc.podiums,
            total_points: acc.total_points,
            dnfs: acc.dnfs,
            avg_position_change: acc.avg_position_change(),
            full_name: names.get(driver_id).map(|n| n.to_string()),
            win_rate: acc.wins as f64 / acc.races as f64,
            podium_rate: acc.podiums as f64 / acc.races as f64,
            dnf_rate: acc.dnfs as f64 / acc.races as f64,
        })
        .collect();
    stats.sort_by(|a, b| a.driver_id.cmp(&b.driver_id));

    info!(drivers = stats.len(), "Aggregated driver statistics");
    stats
}

/// Group results by constructor, attaching the display name from the
/// constructors reference table. Output order is deterministic.
pub fn aggregate_constructors(
    results: &[ResultRow],
    constructors: &[Constructor],
) -> Vec<ConstructorStats> {
    let names: HashMap<&str, &str> = constructors
        .iter()
        .filter_map(|c| Some((c.constructor_id.as_deref()?, c.name.as_deref()?)))
        .collect();

    let mut groups: HashMap<&str, GroupAccumulator> = HashMap::new();
    for row in results {
        let Some(constructor_id) = row.constructor_id.as_deref() else {
            continue;
        };
        groups.entry(constructor_id).or_default().add(row);
    }

    let mut stats: Vec<ConstructorStats> = groups
        .into_iter()
        .map(|(constructor_id, acc)| ConstructorStats {
            constructor_id: constructor_id.to_string(),
            races: acc.races,
            wins: acc.wins,
            podiums: acc.podiums,
            total_points: acc.total_points,
            dnfs: acc.dnfs,
            name: names.get(constructor_id).map(|n| n.to_string()),
            win_rate: acc.wins as f64 / acc.races as f64,
            podium_rate: acc.podiums as f64 / acc.races as f64,
        })
        .collect();
    stats.sort_by(|a, b| a.constructor_id.cmp(&b.constructor_id));

    info!(constructors = stats.len(), "Aggregated constructor statistics");
    stats
}
