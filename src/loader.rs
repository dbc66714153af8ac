use crate::error::{PipelineError, Result};
use crate::types::{
    RawCircuit, RawConstructor, RawDriver, RawLapTime, RawPitStop, RawQualifying, RawRace,
    RawResult, RawTables,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Read one CSV table into its raw row type.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    debug!(table = %path.display(), rows = rows.len(), "Loaded table");
    Ok(rows)
}

fn read_required<T: DeserializeOwned>(data_dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = data_dir.join(file);
    if !path.exists() {
        return Err(PipelineError::MissingTable(file.to_string()));
    }
    read_table(&path)
}

fn read_optional<T: DeserializeOwned>(data_dir: &Path, file: &str) -> Result<Option<Vec<T>>> {
    let path = data_dir.join(file);
    if !path.exists() {
        info!(table = file, "Optional table not present, skipping");
        return Ok(None);
    }
    read_table(&path).map(Some)
}

/// Load all source tables from a data directory.
///
/// The four required tables (races, drivers, constructors, results) must
/// exist or the run fails before any cleaning starts. Optional tables that
/// are absent load as `None` and their downstream features degrade.
pub fn load_tables(data_dir: &Path) -> Result<RawTables> {
    info!(data_dir = %data_dir.display(), "Loading data files");

    let tables = RawTables {
        races: read_required::<RawRace>(data_dir, "races.csv")?,
        drivers: read_required::<RawDriver>(data_dir, "drivers.csv")?,
        constructors: read_required::<RawConstructor>(data_dir, "constructors.csv")?,
        results: read_required::<RawResult>(data_dir, "results.csv")?,
        qualifying: read_optional::<RawQualifying>(data_dir, "qualifying.csv")?,
        pitstops: read_optional::<RawPitStop>(data_dir, "pitstops.csv")?,
        laptimes: read_optional::<RawLapTime>(data_dir, "laptimes.csv")?,
        circuits: read_optional::<RawCircuit>(data_dir, "circuits.csv")?,
    };

    info!(
        races = tables.races.len(),
        drivers = tables.drivers.len(),
        constructors = tables.constructors.len(),
        results = tables.results.len(),
        "Data loaded successfully"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_minimal_tables(dir: &Path) {
        fs::write(
            dir.join("races.csv"),
            "raceId,year,round,circuitId,name,date\n1,2023,1,monza,Italian GP,2023-09-03\n",
        )
        .unwrap();
        fs::write(
            dir.join("drivers.csv"),
            "driverId,forename,surname,dob,nationality,code\nleclerc,Charles,Leclerc,1997-10-16,Monegasque,LEC\n",
        )
        .unwrap();
        fs::write(
            dir.join("constructors.csv"),
            "constructorId,name,nationality\nferrari,Ferrari,Italian\n",
        )
        .unwrap();
        fs::write(
            dir.join("results.csv"),
            "resultId,raceId,year,driverId,constructorId,grid,position,positionOrder,points,laps,milliseconds,status\n1,1,2023,leclerc,ferrari,1,1,1,25,53,5523617,Finished\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_required_tables() {
        let dir = tempdir().unwrap();
        write_minimal_tables(dir.path());

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.races.len(), 1);
        assert_eq!(tables.results.len(), 1);
        assert!(tables.qualifying.is_none());
        assert!(tables.circuits.is_none());
    }

    #[test]
    fn missing_required_table_is_fatal() {
        let dir = tempdir().unwrap();
        write_minimal_tables(dir.path());
        fs::remove_file(dir.path().join("results.csv")).unwrap();

        let err = load_tables(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingTable(ref t) if t == "results.csv"));
    }

    #[test]
    fn absent_columns_become_none() {
        let dir = tempdir().unwrap();
        write_minimal_tables(dir.path());
        // Results export without a status column
        fs::write(
            dir.path().join("results.csv"),
            "resultId,raceId,year,driverId,constructorId,grid,position\n1,1,2023,leclerc,ferrari,1,1\n",
        )
        .unwrap();

        let tables = load_tables(dir.path()).unwrap();
        assert!(tables.results[0].status.is_none());
        assert!(tables.results[0].points.is_none());
    }
}
