//! Two-driver comparison over the pipeline output.
//!
//! Looks drivers up by display name in the driver summary table; an unknown
//! name is a caller-facing error, never a silent empty comparison.

use crate::error::{PipelineError, Result};
use crate::pipeline::aggregate::DriverStats;
use crate::pipeline::PipelineOutput;
use serde::Serialize;
use std::collections::BTreeSet;

/// One metric compared across the two drivers.
#[derive(Debug, Clone, Serialize)]
pub struct MetricPair {
    pub name: &'static str,
    pub driver1: Option<f64>,
    pub driver2: Option<f64>,
    /// Values are percentages (rates scaled by 100)
    pub percent: bool,
}

/// The full comparison report for two drivers.
#[derive(Debug, Clone, Serialize)]
pub struct DriverComparison {
    pub driver1: String,
    pub driver2: String,
    pub metrics: Vec<MetricPair>,
    /// Number of seasons in which both drivers have results.
    pub common_years: usize,
}

fn find_by_name<'a>(stats: &'a [DriverStats], name: &str) -> Result<&'a DriverStats> {
    stats
        .iter()
        .find(|s| s.full_name.as_deref() == Some(name))
        .ok_or_else(|| PipelineError::DriverNotFound(name.to_string()))
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let mut sum = 0i64;
    let mut count = 0u64;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}

fn history<'a>(
    output: &'a PipelineOutput,
    driver_id: &'a str,
) -> impl Iterator<Item = &'a crate::pipeline::join::MergedResult> + 'a {
    output
        .merged
        .rows
        .iter()
        .filter(move |r| r.driver_id.as_deref() == Some(driver_id))
}

fn avg_position(output: &PipelineOutput, driver_id: &str) -> Option<f64> {
    mean(history(output, driver_id).filter_map(|r| r.position))
}

fn best_position(output: &PipelineOutput, driver_id: &str) -> Option<f64> {
    history(output, driver_id)
        .filter_map(|r| r.position)
        .min()
        .map(|p| p as f64)
}

fn avg_change(output: &PipelineOutput, driver_id: &str) -> Option<f64> {
    mean(history(output, driver_id).filter_map(|r| r.position_change))
}

fn seasons(output: &PipelineOutput, driver_id: &str) -> BTreeSet<i64> {
    history(output, driver_id).filter_map(|r| r.year).collect()
}

/// Compare two drivers by display name across the summary metrics and their
/// race history in the merged dataset.
pub fn compare_drivers(
    output: &PipelineOutput,
    driver1_name: &str,
    driver2_name: &str,
) -> Result<DriverComparison> {
    let driver1 = find_by_name(&output.driver_stats, driver1_name)?;
    let driver2 = find_by_name(&output.driver_stats, driver2_name)?;

    let common_years = seasons(output, &driver1.driver_id)
        .intersection(&seasons(output, &driver2.driver_id))
        .count();

    let metrics = vec![
        MetricPair {
            name: "wins",
            driver1: Some(driver1.wins as f64),
            driver2: Some(driver2.wins as f64),
            percent: false,
        },
        MetricPair {
            name: "podiums",
            driver1: Some(driver1.podiums as f64),
            driver2: Some(driver2.podiums as f64),
            percent: false,
        },
        MetricPair {
            name: "total_points",
            driver1: Some(driver1.total_points),
            driver2: Some(driver2.total_points),
            percent: false,
        },
        MetricPair {
            name: "races",
            driver1: Some(driver1.races as f64),
            driver2: Some(driver2.races as f64),
            percent: false,
        },
        MetricPair {
            name: "win_rate",
            driver1: Some(driver1.win_rate * 100.0),
            driver2: Some(driver2.win_rate * 100.0),
            percent: true,
        },
        MetricPair {
            name: "podium_rate",
            driver1: Some(driver1.podium_rate * 100.0),
            driver2: Some(driver2.podium_rate * 100.0),
            percent: true,
        },
        MetricPair {
            name: "dnf_rate",
            driver1: Some(driver1.dnf_rate * 100.0),
            driver2: Some(driver2.dnf_rate * 100.0),
            percent: true,
        },
        MetricPair {
            name: "avg_position",
            driver1: avg_position(output, &driver1.driver_id),
            driver2: avg_position(output, &driver2.driver_id),
            percent: false,
        },
        MetricPair {
            name: "best_position",
            driver1: best_position(output, &driver1.driver_id),
            driver2: best_position(output, &driver2.driver_id),
            percent: false,
        },
        MetricPair {
            name: "avg_position_change",
            driver1: avg_change(output, &driver1.driver_id),
            driver2: avg_change(output, &driver2.driver_id),
            percent: false,
        },
    ];

    Ok(DriverComparison {
        driver1: driver1_name.to_string(),
        driver2: driver2_name.to_string(),
        metrics,
        common_years,
    })
}

impl DriverComparison {
    /// Render the comparison as a console report.
    pub fn print_report(&self) {
        println!("{}", "=".repeat(80));
        println!("DRIVER COMPARISON: {} vs {}", self.driver1, self.driver2);
        println!("{}", "=".repeat(80));

        for metric in &self.metrics {
            let fmt = |v: Option<f64>| match v {
                Some(v) if metric.percent => format!("{:>8.2}%", v),
                Some(v) => format!("{:>8.2}", v),
                None => format!("{:>8}", "-"),
            };
            println!(
                "{:25} {}  vs  {}",
                metric.name,
                fmt(metric.driver1),
                fmt(metric.driver2)
            );
        }

        println!("\nCommon racing years: {}", self.common_years);
        println!("{}", "=".repeat(80));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DnfStatusCatalog;
    use crate::pipeline::aggregate::{aggregate_constructors, aggregate_drivers};
    use crate::pipeline::clean::*;
    use crate::pipeline::join::merge_tables;
    use crate::types::*;

    fn result(driver: &str, year: &str, grid: &str, position: &str, points: &str) -> RawResult {
        RawResult {
            race_id: Some("1".into()),
            year: Some(year.into()),
            driver_id: Some(driver.into()),
            constructor_id: Some("ferrari".into()),
            grid: Some(grid.into()),
            position: Some(position.into()),
            points: Some(points.into()),
            status: Some("Finished".into()),
            ..Default::default()
        }
    }

    fn sample_output() -> PipelineOutput {
        let catalog = DnfStatusCatalog::default_catalog();
        let tables = CleanTables {
            races: Vec::new(),
            drivers: clean_drivers(&[
                RawDriver {
                    driver_id: Some("leclerc".into()),
                    forename: Some("Charles".into()),
                    surname: Some("Leclerc".into()),
                    ..Default::default()
                },
                RawDriver {
                    driver_id: Some("norris".into()),
                    forename: Some("Lando".into()),
                    surname: Some("Norris".into()),
                    ..Default::default()
                },
            ]),
            constructors: Vec::new(),
            results: clean_results(
                &[
                    result("leclerc", "2023", "1", "1", "25"),
                    result("leclerc", "2024", "4", "2", "18"),
                    result("norris", "2024", "2", "3", "15"),
                ],
                catalog,
            ),
            qualifying: None,
            pitstops: None,
            laptimes: None,
            circuits: None,
        };
        let merged = merge_tables(&tables).unwrap();
        let driver_stats = aggregate_drivers(&tables.results, &tables.drivers);
        let constructor_stats = aggregate_constructors(&tables.results, &tables.constructors);
        PipelineOutput {
            tables,
            merged,
            driver_stats,
            constructor_stats,
        }
    }

    #[test]
    fn compares_known_drivers() {
        let output = sample_output();
        let comparison =
            compare_drivers(&output, "Charles Leclerc", "Lando Norris").unwrap();

        assert_eq!(comparison.common_years, 1);
        let wins = comparison.metrics.iter().find(|m| m.name == "wins").unwrap();
        assert_eq!(wins.driver1, Some(1.0));
        assert_eq!(wins.driver2, Some(0.0));

        let best = comparison
            .metrics
            .iter()
            .find(|m| m.name == "best_position")
            .unwrap();
        assert_eq!(best.driver1, Some(1.0));
        assert_eq!(best.driver2, Some(3.0));
    }

    #[test]
    fn unknown_driver_is_reported_not_found() {
        let output = sample_output();
        let err = compare_drivers(&output, "Charles Leclerc", "Ayrton Senna").unwrap_err();
        assert!(matches!(err, PipelineError::DriverNotFound(ref name) if name == "Ayrton Senna"));
    }
}
