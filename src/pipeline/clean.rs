//! Per-table cleaning routines.
//!
//! Each cleaner is a pure function: it consumes one raw table snapshot and
//! returns a new cleaned snapshot, typed with explicit `Option` fields for
//! every value that can be missing. Cleaners are independent of each other
//! and idempotent — re-cleaning already-cleaned data is a no-op.

use crate::config::DnfStatusCatalog;
use crate::pipeline::coerce::{parse_date, parse_float, parse_int, parse_text};
use crate::pipeline::duration::duration_seconds;
use crate::types::{
    RawCircuit, RawConstructor, RawDriver, RawLapTime, RawPitStop, RawQualifying, RawRace,
    RawResult,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// A cleaned race row, deduplicated by (year, round).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Race {
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub round: Option<i64>,
    pub circuit_id: Option<String>,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A cleaned driver row with the derived display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub driver_id: Option<String>,
    pub forename: Option<String>,
    pub surname: Option<String>,
    /// Trimmed `forename surname`; empty parts contribute an empty string,
    /// so a driver with no recorded name gets `""`, never a missing value.
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constructor {
    pub constructor_id: Option<String>,
    pub name: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circuit {
    pub circuit_id: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A cleaned result row — the fact table spine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub result_id: Option<i64>,
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub driver_id: Option<String>,
    pub constructor_id: Option<String>,
    pub grid: Option<i64>,
    /// Finishing position. Retirement codes ('R', 'D', ...) coerce to `None`,
    /// which reads as "no finishing position" everywhere downstream.
    pub position: Option<i64>,
    pub position_order: Option<i64>,
    pub points: Option<f64>,
    pub laps: Option<i64>,
    pub milliseconds: Option<i64>,
    pub fastest_lap: Option<i64>,
    pub rank: Option<i64>,
    pub status: Option<String>,
    /// True iff `status` is in the configured non-finish catalog.
    pub is_dnf: bool,
    /// `grid - position`; positive means positions gained.
    pub position_change: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qualifying {
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub driver_id: Option<String>,
    pub number: Option<i64>,
    pub position: Option<i64>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q1_seconds: Option<f64>,
    pub q2_seconds: Option<f64>,
    pub q3_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitStop {
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub driver_id: Option<String>,
    pub stop: Option<i64>,
    pub lap: Option<i64>,
    pub duration: Option<String>,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTime {
    pub race_id: Option<i64>,
    pub year: Option<i64>,
    pub driver_id: Option<String>,
    pub lap: Option<i64>,
    pub position: Option<i64>,
    pub time: Option<String>,
    pub time_seconds: Option<f64>,
}

/// All cleaned table snapshots for one pipeline run. Immutable once built;
/// the join and aggregation engines only ever read from it.
#[derive(Debug, Clone, Default)]
pub struct CleanTables {
    pub races: Vec<Race>,
    pub drivers: Vec<Driver>,
    pub constructors: Vec<Constructor>,
    pub results: Vec<ResultRow>,
    pub qualifying: Option<Vec<Qualifying>>,
    pub pitstops: Option<Vec<PitStop>>,
    pub laptimes: Option<Vec<LapTime>>,
    pub circuits: Option<Vec<Circuit>>,
}

fn opt(value: &Option<String>) -> Option<&str> {
    value.as_deref()
}

/// Clean the races table: coerce ids and date, then drop duplicate
/// (year, round) rows, keeping the first occurrence in file order.
pub fn clean_races(raw: &[RawRace]) -> Vec<Race> {
    let mut seen: HashSet<(Option<i64>, Option<i64>)> = HashSet::new();
    let mut cleaned = Vec::with_capacity(raw.len());
    for row in raw {
        let race = Race {
            race_id: parse_int(opt(&row.race_id)),
            year: parse_int(opt(&row.year)),
            round: parse_int(opt(&row.round)),
            circuit_id: parse_text(opt(&row.circuit_id)),
            name: parse_text(opt(&row.name)),
            date: parse_date(opt(&row.date)),
        };
        if seen.insert((race.year, race.round)) {
            cleaned.push(race);
        }
    }
    cleaned
}

/// Clean the drivers table: build `full_name`, coerce the date of birth.
pub fn clean_drivers(raw: &[RawDriver]) -> Vec<Driver> {
    raw.iter()
        .map(|row| {
            let forename = row.forename.as_deref().unwrap_or("").trim();
            let surname = row.surname.as_deref().unwrap_or("").trim();
            let full_name = format!("{} {}", forename, surname).trim().to_string();
            Driver {
                driver_id: parse_text(opt(&row.driver_id)),
                forename: parse_text(opt(&row.forename)),
                surname: parse_text(opt(&row.surname)),
                full_name,
                dob: parse_date(opt(&row.dob)),
                nationality: parse_text(opt(&row.nationality)),
                code: parse_text(opt(&row.code)),
            }
        })
        .collect()
}

/// Constructors are reference-only: type coercion, nothing derived.
pub fn clean_constructors(raw: &[RawConstructor]) -> Vec<Constructor> {
    raw.iter()
        .map(|row| Constructor {
            constructor_id: parse_text(opt(&row.constructor_id)),
            name: parse_text(opt(&row.name)),
            nationality: parse_text(opt(&row.nationality)),
        })
        .collect()
}

/// Circuits are reference-only: type coercion, nothing derived.
pub fn clean_circuits(raw: &[RawCircuit]) -> Vec<Circuit> {
    raw.iter()
        .map(|row| Circuit {
            circuit_id: parse_text(opt(&row.circuit_id)),
            name: parse_text(opt(&row.name)),
            country: parse_text(opt(&row.country)),
            lat: parse_float(opt(&row.lat)),
            lng: parse_float(opt(&row.lng)),
        })
        .collect()
}

/// Clean the results table: coerce all numeric columns and derive `is_dnf`
/// and `position_change`.
pub fn clean_results(raw: &[RawResult], dnf_catalog: &DnfStatusCatalog) -> Vec<ResultRow> {
    raw.iter()
        .map(|row| {
            let grid = parse_int(opt(&row.grid));
            let position = parse_int(opt(&row.position));
            let status = parse_text(opt(&row.status));
            let is_dnf = status
                .as_deref()
                .map(|s| dnf_catalog.is_dnf(s))
                .unwrap_or(false);
            let position_change = match (grid, position) {
                (Some(g), Some(p)) => Some(g - p),
                _ => None,
            };
            ResultRow {
                result_id: parse_int(opt(&row.result_id)),
                race_id: parse_int(opt(&row.race_id)),
                year: parse_int(opt(&row.year)),
                driver_id: parse_text(opt(&row.driver_id)),
                constructor_id: parse_text(opt(&row.constructor_id)),
                grid,
                position,
                position_order: parse_int(opt(&row.position_order)),
                points: parse_float(opt(&row.points)),
                laps: parse_int(opt(&row.laps)),
                milliseconds: parse_int(opt(&row.milliseconds)),
                fastest_lap: parse_int(opt(&row.fastest_lap)),
                rank: parse_int(opt(&row.rank)),
                status,
                is_dnf,
                position_change,
            }
        })
        .collect()
}

/// Clean the qualifying table: coerce numerics, derive session times in
/// seconds from the q1/q2/q3 duration strings.
pub fn clean_qualifying(raw: &[RawQualifying]) -> Vec<Qualifying> {
    raw.iter()
        .map(|row| Qualifying {
            race_id: parse_int(opt(&row.race_id)),
            year: parse_int(opt(&row.year)),
            driver_id: parse_text(opt(&row.driver_id)),
            number: parse_int(opt(&row.number)),
            position: parse_int(opt(&row.position)),
            q1: parse_text(opt(&row.q1)),
            q2: parse_text(opt(&row.q2)),
            q3: parse_text(opt(&row.q3)),
            q1_seconds: duration_seconds(opt(&row.q1)),
            q2_seconds: duration_seconds(opt(&row.q2)),
            q3_seconds: duration_seconds(opt(&row.q3)),
        })
        .collect()
}

/// Clean the pit-stops table: coerce numerics, derive the stop duration in
/// seconds.
pub fn clean_pitstops(raw: &[RawPitStop]) -> Vec<PitStop> {
    raw.iter()
        .map(|row| PitStop {
            race_id: parse_int(opt(&row.race_id)),
            year: parse_int(opt(&row.year)),
            driver_id: parse_text(opt(&row.driver_id)),
            stop: parse_int(opt(&row.stop)),
            lap: parse_int(opt(&row.lap)),
            duration: parse_text(opt(&row.duration)),
            duration_seconds: duration_seconds(opt(&row.duration)),
        })
        .collect()
}

/// Clean the lap-times table: coerce numerics, derive the lap time in
/// seconds.
pub fn clean_laptimes(raw: &[RawLapTime]) -> Vec<LapTime> {
    raw.iter()
        .map(|row| LapTime {
            race_id: parse_int(opt(&row.race_id)),
            year: parse_int(opt(&row.year)),
            driver_id: parse_text(opt(&row.driver_id)),
            lap: parse_int(opt(&row.lap)),
            position: parse_int(opt(&row.position)),
            time: parse_text(opt(&row.time)),
            time_seconds: duration_seconds(opt(&row.time)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn raw_result(grid: &str, position: &str, status: &str) -> RawResult {
        RawResult {
            result_id: Some("1".into()),
            race_id: Some("1".into()),
            year: Some("2023".into()),
            driver_id: Some("leclerc".into()),
            constructor_id: Some("ferrari".into()),
            grid: Some(grid.into()),
            position: Some(position.into()),
            points: Some("10".into()),
            status: Some(status.into()),
            ..Default::default()
        }
    }

    #[test]
    fn races_deduplicate_by_year_and_round_keeping_first() {
        let raw = vec![
            RawRace {
                race_id: Some("1".into()),
                year: Some("2023".into()),
                round: Some("1".into()),
                name: Some("Bahrain GP".into()),
                ..Default::default()
            },
            RawRace {
                race_id: Some("99".into()),
                year: Some("2023".into()),
                round: Some("1".into()),
                name: Some("Duplicate".into()),
                ..Default::default()
            },
            RawRace {
                race_id: Some("2".into()),
                year: Some("2023".into()),
                round: Some("2".into()),
                name: Some("Saudi GP".into()),
                ..Default::default()
            },
        ];
        let cleaned = clean_races(&raw);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].race_id, Some(1));
        assert_eq!(cleaned[0].name.as_deref(), Some("Bahrain GP"));
    }

    #[test]
    fn driver_full_name_handles_missing_parts() {
        let raw = vec![
            RawDriver {
                driver_id: Some("leclerc".into()),
                forename: Some("Charles".into()),
                surname: Some("Leclerc".into()),
                ..Default::default()
            },
            RawDriver {
                driver_id: Some("mystery".into()),
                forename: None,
                surname: Some("Verstappen".into()),
                ..Default::default()
            },
            RawDriver {
                driver_id: Some("ghost".into()),
                forename: None,
                surname: None,
                ..Default::default()
            },
        ];
        let cleaned = clean_drivers(&raw);
        assert_eq!(cleaned[0].full_name, "Charles Leclerc");
        assert_eq!(cleaned[1].full_name, "Verstappen");
        // Empty parts yield an empty string, not a missing value
        assert_eq!(cleaned[2].full_name, "");
    }

    #[test]
    fn dnf_flag_follows_status_catalog() {
        let catalog = DnfStatusCatalog::default_catalog();
        let raw = vec![
            raw_result("5", "2", "Finished"),
            raw_result("3", "R", "Accident"),
        ];
        let cleaned = clean_results(&raw, catalog);
        assert!(!cleaned[0].is_dnf);
        assert!(cleaned[1].is_dnf);
    }

    #[test]
    fn absent_status_means_no_dnf() {
        let catalog = DnfStatusCatalog::default_catalog();
        let mut raw = raw_result("5", "2", "Accident");
        raw.status = None;
        let cleaned = clean_results(&[raw], catalog);
        assert!(!cleaned[0].is_dnf);
    }

    #[test]
    fn position_change_needs_both_grid_and_position() {
        let catalog = DnfStatusCatalog::default_catalog();
        let cleaned = clean_results(
            &[raw_result("5", "2", "Finished"), raw_result("3", "R", "Accident")],
            catalog,
        );
        assert_eq!(cleaned[0].position_change, Some(3));
        // Retirement code coerces position to missing; change is missing too
        assert_eq!(cleaned[1].position, None);
        assert_eq!(cleaned[1].position_change, None);
    }

    #[test]
    fn qualifying_sessions_convert_to_seconds() {
        let raw = vec![RawQualifying {
            race_id: Some("1".into()),
            year: Some("2023".into()),
            driver_id: Some("leclerc".into()),
            position: Some("1".into()),
            q1: Some("1:23.456".into()),
            q2: Some("1:22.000".into()),
            q3: None,
            ..Default::default()
        }];
        let cleaned = clean_qualifying(&raw);
        assert_eq!(cleaned[0].q1_seconds, Some(83.456));
        assert_eq!(cleaned[0].q2_seconds, Some(82.0));
        assert_eq!(cleaned[0].q3_seconds, None);
    }

    #[test]
    fn pitstop_and_laptime_durations_convert_to_seconds() {
        let stops = clean_pitstops(&[RawPitStop {
            duration: Some("21.847".into()),
            ..Default::default()
        }]);
        assert_eq!(stops[0].duration_seconds, Some(21.847));

        let laps = clean_laptimes(&[RawLapTime {
            time: Some("1:31.005".into()),
            ..Default::default()
        }]);
        assert_eq!(laps[0].time_seconds, Some(91.005));
    }

    // Cleaners must be idempotent: re-serializing a cleaned row back into its
    // raw string form and cleaning again yields the identical cleaned row.
    #[test]
    fn cleaning_is_idempotent() {
        let catalog = DnfStatusCatalog::default_catalog();
        let raw = vec![
            raw_result("5", "2", "Finished"),
            raw_result("12", "R", "Engine"),
        ];
        let first = clean_results(&raw, catalog);

        let reserialized: Vec<RawResult> = first
            .iter()
            .map(|r| RawResult {
                result_id: r.result_id.map(|v| v.to_string()),
                race_id: r.race_id.map(|v| v.to_string()),
                year: r.year.map(|v| v.to_string()),
                driver_id: r.driver_id.clone(),
                constructor_id: r.constructor_id.clone(),
                grid: r.grid.map(|v| v.to_string()),
                position: r.position.map(|v| v.to_string()),
                position_order: r.position_order.map(|v| v.to_string()),
                points: r.points.map(|v| v.to_string()),
                laps: r.laps.map(|v| v.to_string()),
                milliseconds: r.milliseconds.map(|v| v.to_string()),
                fastest_lap: r.fastest_lap.map(|v| v.to_string()),
                rank: r.rank.map(|v| v.to_string()),
                status: r.status.clone(),
            })
            .collect();
        let second = clean_results(&reserialized, catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn cleaning_drivers_is_idempotent() {
        let raw = vec![RawDriver {
            driver_id: Some("leclerc".into()),
            forename: Some("  Charles".into()),
            surname: Some("Leclerc  ".into()),
            dob: Some("1997-10-16".into()),
            nationality: Some("Monegasque".into()),
            code: Some("LEC".into()),
        }];
        let first = clean_drivers(&raw);

        let reserialized: Vec<RawDriver> = first
            .iter()
            .map(|d| RawDriver {
                driver_id: d.driver_id.clone(),
                forename: d.forename.clone(),
                surname: d.surname.clone(),
                dob: d.dob.map(|v| v.format("%Y-%m-%d").to_string()),
                nationality: d.nationality.clone(),
                code: d.code.clone(),
            })
            .collect();
        let second = clean_drivers(&reserialized);
        assert_eq!(first, second);
    }
}
