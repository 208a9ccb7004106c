//! Artifact loading
//!
//! Reads the serving artifacts from disk: the item catalog (`items.csv`),
//! the global popularity list (`popular.json`), and one per-user table per
//! offline model (`models/<name>.json`). Loading happens once during
//! startup and the resulting [`ModelRegistry`] is handed to the API layer
//! as explicit state; nothing here runs at import time.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

use super::registry::{ModelRegistry, UserRecoTable, POPULAR_MODEL, RANDOM_MODEL};
use super::topn::ItemId;

/// Catalog file name inside the artifacts directory
pub const CATALOG_FILE: &str = "items.csv";

/// Popularity list file name inside the artifacts directory
pub const POPULAR_FILE: &str = "popular.json";

/// Sub-directory holding per-model user tables
pub const MODELS_DIR: &str = "models";

#[derive(Debug, Deserialize)]
struct CatalogRow {
    item_id: ItemId,
}

/// Load every serving artifact under `dir` into a registry
pub fn load_registry(dir: &Path) -> Result<ModelRegistry> {
    let catalog = load_catalog(&dir.join(CATALOG_FILE))?;
    let popular = load_popular(&dir.join(POPULAR_FILE))?;
    let tables = load_tables(&dir.join(MODELS_DIR))?;

    info!(
        "Loaded artifacts from {}: {} catalog items, {} popular items, {} model tables",
        dir.display(),
        catalog.len(),
        popular.len(),
        tables.len()
    );

    Ok(ModelRegistry::new(catalog, popular, tables))
}

fn load_catalog(path: &Path) -> Result<Vec<ItemId>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::artifact(format!("failed to open catalog {}: {e}", path.display())))?;

    let mut items = Vec::new();
    for row in reader.deserialize() {
        let row: CatalogRow = row?;
        items.push(row.item_id);
    }

    if items.is_empty() {
        return Err(Error::artifact(format!(
            "catalog {} contains no items",
            path.display()
        )));
    }

    Ok(items)
}

fn load_popular(path: &Path) -> Result<Vec<ItemId>> {
    let file = File::open(path).map_err(|e| {
        Error::artifact_with_source(
            format!("failed to open popularity list {}", path.display()),
            e,
        )
    })?;
    let items: Vec<ItemId> = serde_json::from_reader(BufReader::new(file))?;

    if items.is_empty() {
        return Err(Error::artifact(format!(
            "popularity list {} is empty",
            path.display()
        )));
    }

    // The fallback top-up assumes a duplicate-free list
    Ok(dedup_preserving_order(items))
}

fn load_tables(dir: &Path) -> Result<HashMap<String, UserRecoTable>> {
    let mut tables = HashMap::new();

    // No models directory means only the built-in models are served
    if !dir.is_dir() {
        return Ok(tables);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| {
        Error::artifact_with_source(format!("failed to read model directory {}", dir.display()), e)
    })?;

    for entry in entries {
        let path = entry.map_err(Error::from)?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let name = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        if name == RANDOM_MODEL || name == POPULAR_MODEL {
            return Err(Error::artifact(format!(
                "model table '{name}' collides with a built-in model"
            )));
        }

        let file = File::open(&path).map_err(|e| {
            Error::artifact_with_source(format!("failed to open model table {}", path.display()), e)
        })?;
        let table: UserRecoTable = serde_json::from_reader(BufReader::new(file))?;
        tables.insert(name, table);
    }

    Ok(tables)
}

fn dedup_preserving_order(items: Vec<ItemId>) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_artifacts(dir: &Path) {
        fs::write(
            dir.join(CATALOG_FILE),
            "item_id\n10\n11\n12\n13\n14\n",
        )
        .unwrap();
        fs::write(dir.join(POPULAR_FILE), "[12, 10, 12, 14]").unwrap();
        fs::create_dir_all(dir.join(MODELS_DIR)).unwrap();
        fs::write(
            dir.join(MODELS_DIR).join("als.json"),
            r#"{"1": [11, 13], "2": [10]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_registry() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path());

        let registry = load_registry(dir.path()).unwrap();
        assert_eq!(registry.catalog_size(), 5);
        assert!(registry.contains("als"));
        assert!(registry.contains("random"));
        assert_eq!(registry.recommend("als", 1, 2).unwrap(), vec![11, 13]);
    }

    #[test]
    fn test_popular_duplicates_are_dropped() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path());

        let registry = load_registry(dir.path()).unwrap();
        assert_eq!(
            registry.recommend("popular", 7, 10).unwrap(),
            vec![12, 10, 14]
        );
    }

    #[test]
    fn test_missing_catalog_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(POPULAR_FILE), "[1]").unwrap();

        let err = load_registry(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Artifact { .. }));
    }

    #[test]
    fn test_empty_popular_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CATALOG_FILE), "item_id\n10\n").unwrap();
        fs::write(dir.path().join(POPULAR_FILE), "[]").unwrap();

        let err = load_registry(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Artifact { .. }));
    }

    #[test]
    fn test_missing_models_dir_serves_builtins_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CATALOG_FILE), "item_id\n10\n11\n").unwrap();
        fs::write(dir.path().join(POPULAR_FILE), "[10, 11]").unwrap();

        let registry = load_registry(dir.path()).unwrap();
        assert_eq!(registry.model_names().len(), 2);
        assert!(!registry.contains("als"));
    }

    #[test]
    fn test_reserved_table_name_is_rejected() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(MODELS_DIR).join("random.json"), "{}").unwrap();

        let err = load_registry(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Artifact { .. }));
    }
}
