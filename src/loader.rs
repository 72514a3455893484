//! Reads the labeled JSON collections that make up the catalog.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use log::info;

use crate::catalog::{Catalog, Collection, RawItem};
use crate::error::{LoadError, SourceError};

pub const UNKNOWN_DOMAIN: &str = "Unknown Domain";

/// Built-in collections: file name → domain label, in catalog order.
pub const DOMAIN_FILES: [(&str, &str); 8] = [
    (
        "cissp_security_risk_management_study.json",
        "Security and Risk Management",
    ),
    ("cissp_asset_security_study.json", "Asset Security"),
    (
        "cissp_security_architecture_engineering_study.json",
        "Security Architecture and Engineering",
    ),
    (
        "cissp_communication_network_security_study.json",
        "Communication and Network Security",
    ),
    (
        "cissp_identity_access_management_study.json",
        "Identity and Access Management",
    ),
    (
        "cissp_security_assessment_testing_study.json",
        "Security Assessment and Testing",
    ),
    ("cissp_security_operations_study.json", "Security Operations"),
    (
        "cissp_software_development_security_study.json",
        "Software Development Security",
    ),
];

/// Domain label for a collection file, by base name.
pub fn domain_for_file(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    DOMAIN_FILES
        .iter()
        .find(|(file, _)| *file == name)
        .map_or(UNKNOWN_DOMAIN, |(_, label)| *label)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub label: String,
    pub path: PathBuf,
}

impl CatalogSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// `LABEL=PATH`, or a bare `PATH` labeled by its file name.
    pub fn parse(arg: &str) -> Result<Self, String> {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err("empty source".into());
        }
        match arg.split_once('=') {
            Some((label, path)) => {
                let (label, path) = (label.trim(), path.trim());
                if label.is_empty() || path.is_empty() {
                    return Err(format!("expected LABEL=PATH, got {arg:?}"));
                }
                Ok(Self::new(label, path))
            }
            None => {
                let path = PathBuf::from(arg);
                Ok(Self::new(domain_for_file(&path), path))
            }
        }
    }
}

/// The eight built-in collections under `data_dir`.
pub fn default_sources(data_dir: &Path) -> Vec<CatalogSource> {
    DOMAIN_FILES
        .iter()
        .map(|(file, label)| CatalogSource::new(*label, data_dir.join(file)))
        .collect()
}

async fn read_source(source: &CatalogSource) -> Result<Collection, SourceError> {
    let bytes = tokio::fs::read(&source.path)
        .await
        .map_err(|e| SourceError::Read {
            label: source.label.clone(),
            path: source.path.clone(),
            source: e,
        })?;
    let items: Vec<RawItem> = serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse {
        label: source.label.clone(),
        path: source.path.clone(),
        source: e,
    })?;
    Ok(Collection {
        domain: source.label.clone(),
        items,
    })
}

/// Reads every source concurrently. Any failure fails the whole load and
/// the error lists every source that failed.
pub async fn load_all(sources: &[CatalogSource]) -> Result<Catalog, LoadError> {
    if sources.is_empty() {
        return Err(LoadError::NoSources);
    }
    let results = join_all(sources.iter().map(read_source)).await;
    let mut collections = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(c) => collections.push(c),
            Err(e) => failures.push(e),
        }
    }
    if !failures.is_empty() {
        return Err(LoadError::Sources(failures));
    }
    let catalog = Catalog::from_collections(collections)?;
    info!(
        "loaded {} study items from {} sources",
        catalog.len(),
        sources.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn known_files_map_to_domains() {
        assert_eq!(
            domain_for_file(Path::new("data/cissp_asset_security_study.json")),
            "Asset Security"
        );
        assert_eq!(domain_for_file(Path::new("other.json")), UNKNOWN_DOMAIN);
    }

    #[test]
    fn parse_accepts_label_and_bare_path() {
        assert_eq!(
            CatalogSource::parse("Crypto = data/crypto.json").unwrap(),
            CatalogSource::new("Crypto", "data/crypto.json")
        );
        assert_eq!(
            CatalogSource::parse("cissp_security_operations_study.json").unwrap(),
            CatalogSource::new(
                "Security Operations",
                "cissp_security_operations_study.json"
            )
        );
        assert!(CatalogSource::parse("=x.json").is_err());
        assert!(CatalogSource::parse("").is_err());
    }

    #[test]
    fn default_sources_cover_all_domains() {
        let sources = default_sources(Path::new("data"));
        assert_eq!(sources.len(), 8);
        assert_eq!(sources[0].label, "Security and Risk Management");
        assert_eq!(
            sources[7].path,
            PathBuf::from("data/cissp_software_development_security_study.json")
        );
    }

    #[tokio::test]
    async fn loads_and_stamps_in_source_order() {
        let dir = TempDir::new().unwrap();
        let a = write(
            dir.path(),
            "a.json",
            r#"[{"id": 1, "topic": "T1", "description": "D1", "reference": "R1"}]"#,
        );
        let b = write(
            dir.path(),
            "b.json",
            r#"[{"id": 2, "topic": "T2", "description": "D2"},
                {"id": 3, "topic": "T3", "description": "D3", "extra": true}]"#,
        );
        let catalog = load_all(&[CatalogSource::new("A", a), CatalogSource::new("B", b)])
            .await
            .unwrap();
        let domains: Vec<_> = catalog.items().iter().map(|i| i.domain.as_str()).collect();
        assert_eq!(domains, vec!["A", "B", "B"]);
        assert_eq!(catalog.items()[0].reference, "R1");
    }

    #[tokio::test]
    async fn any_failure_fails_the_whole_load() {
        let dir = TempDir::new().unwrap();
        let good = write(
            dir.path(),
            "good.json",
            r#"[{"id": 1, "topic": "T", "description": "D"}]"#,
        );
        let bad = write(dir.path(), "bad.json", "[{\"id\": 2}");
        let missing = dir.path().join("missing.json");
        let err = load_all(&[
            CatalogSource::new("Good", good),
            CatalogSource::new("Bad", bad),
            CatalogSource::new("Missing", missing),
        ])
        .await
        .unwrap_err();
        match err {
            LoadError::Sources(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(failures[0], SourceError::Parse { .. }));
                assert!(matches!(failures[1], SourceError::Read { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn no_sources_is_an_error() {
        assert!(matches!(load_all(&[]).await, Err(LoadError::NoSources)));
    }
}
