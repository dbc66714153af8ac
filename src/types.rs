use serde::Deserialize;

/// Raw row shapes exactly as they come off the source CSV files.
///
/// Every field is an `Option<String>`: a malformed or empty cell must never
/// abort a load, and a column that is absent from a particular export simply
/// deserializes to `None`. All typing happens later, in the cleaners.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRace {
    #[serde(rename = "raceId", default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(rename = "circuitId", default)]
    pub circuit_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDriver {
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub forename: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConstructor {
    #[serde(rename = "constructorId", default)]
    pub constructor_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCircuit {
    #[serde(rename = "circuitId", default)]
    pub circuit_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResult {
    #[serde(rename = "resultId", default)]
    pub result_id: Option<String>,
    #[serde(rename = "raceId", default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(rename = "constructorId", default)]
    pub constructor_id: Option<String>,
    #[serde(default)]
    pub grid: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(rename = "positionOrder", default)]
    pub position_order: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(default)]
    pub laps: Option<String>,
    #[serde(default)]
    pub milliseconds: Option<String>,
    #[serde(rename = "fastestLap", default)]
    pub fastest_lap: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQualifying {
    #[serde(rename = "raceId", default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub q1: Option<String>,
    #[serde(default)]
    pub q2: Option<String>,
    #[serde(default)]
    pub q3: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPitStop {
    #[serde(rename = "raceId", default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub stop: Option<String>,
    #[serde(default)]
    pub lap: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLapTime {
    #[serde(rename = "raceId", default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub lap: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// The full set of loaded source tables for one pipeline run.
///
/// Required tables are always present; optional tables are `None` when the
/// corresponding file does not exist in the data directory, and the features
/// that depend on them degrade gracefully downstream.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub races: Vec<RawRace>,
    pub drivers: Vec<RawDriver>,
    pub constructors: Vec<RawConstructor>,
    pub results: Vec<RawResult>,
    pub qualifying: Option<Vec<RawQualifying>>,
    pub pitstops: Option<Vec<RawPitStop>>,
    pub laptimes: Option<Vec<RawLapTime>>,
    pub circuits: Option<Vec<RawCircuit>>,
}
