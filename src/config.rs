use crate::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Default DNF status catalog, compiled into the binary.
const DEFAULT_DNF_STATUSES: &str = include_str!("../assets/dnf_statuses.toml");

static DEFAULT_CATALOG: Lazy<DnfStatusCatalog> = Lazy::new(|| {
    DnfStatusCatalog::parse(DEFAULT_DNF_STATUSES)
        .expect("embedded DNF status catalog must be valid TOML")
});

#[derive(Debug, Deserialize)]
struct DnfStatusFile {
    version: String,
    statuses: Vec<String>,
}

/// The closed set of result status labels classified as a non-finish.
///
/// Kept as a versioned resource rather than an inline literal so the
/// classification rules can change without a rebuild.
#[derive(Debug, Clone)]
pub struct DnfStatusCatalog {
    pub version: String,
    statuses: HashSet<String>,
}

impl DnfStatusCatalog {
    fn parse(content: &str) -> Result<Self> {
        let file: DnfStatusFile = toml::from_str(content)?;
        if file.statuses.is_empty() {
            return Err(PipelineError::Config(
                "DNF status catalog contains no statuses".to_string(),
            ));
        }
        Ok(Self {
            version: file.version,
            statuses: file.statuses.into_iter().collect(),
        })
    }

    /// Load a catalog from a TOML override file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read DNF status catalog '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// The compiled-in default catalog.
    pub fn default_catalog() -> &'static Self {
        &DEFAULT_CATALOG
    }

    /// Whether a status label counts as a non-finish.
    pub fn is_dnf(&self, status: &str) -> bool {
        self.statuses.contains(status)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_classifies_known_statuses() {
        let catalog = DnfStatusCatalog::default_catalog();
        assert!(catalog.is_dnf("Accident"));
        assert!(catalog.is_dnf("Engine"));
        assert!(catalog.is_dnf("107% Rule"));
        assert!(!catalog.is_dnf("Finished"));
        assert!(!catalog.is_dnf("+1 Lap"));
    }

    #[test]
    fn override_file_replaces_default_set() {
        let catalog = DnfStatusCatalog::parse(
            "version = \"test\"\nstatuses = [\"Meteor strike\"]\n",
        )
        .unwrap();
        assert!(catalog.is_dnf("Meteor strike"));
        assert!(!catalog.is_dnf("Accident"));
        assert_eq!(catalog.version, "test");
    }

    #[test]
    fn empty_status_list_is_rejected() {
        let result = DnfStatusCatalog::parse("version = \"test\"\nstatuses = []\n");
        assert!(result.is_err());
    }
}
