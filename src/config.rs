use crate::datastore::{ActionHistory, KeywordIndex, HASH_TABLE_SIZE, MAX_STACK_SIZE};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sizing for the catalog containers.
///
/// Missing fields fall back to the defaults, so `{}` is a valid config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub index_buckets: usize,
    pub history_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_buckets: HASH_TABLE_SIZE,
            history_capacity: MAX_STACK_SIZE,
        }
    }
}

impl CatalogConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CatalogConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_buckets == 0 {
            return Err(CatalogError::InvalidBucketCount);
        }
        if self.history_capacity == 0 {
            return Err(CatalogError::InvalidCapacity);
        }
        Ok(())
    }

    pub fn build_index(&self) -> Result<KeywordIndex> {
        KeywordIndex::with_buckets(self.index_buckets)
    }

    pub fn build_history(&self) -> Result<ActionHistory> {
        ActionHistory::with_capacity(self.history_capacity)
    }
}

#[test]
fn config_test() {
    let config = CatalogConfig::from_json("{}").unwrap();
    assert_eq!(config, CatalogConfig::default());
    assert_eq!(config.build_index().unwrap().bucket_count(), 50);
    assert_eq!(config.build_history().unwrap().capacity(), 100);

    let config =
        CatalogConfig::from_json(r#"{"index_buckets": 5, "history_capacity": 2}"#).unwrap();
    assert_eq!(config.build_index().unwrap().bucket_count(), 5);
    assert_eq!(config.build_history().unwrap().capacity(), 2);

    assert!(matches!(
        CatalogConfig::from_json(r#"{"index_buckets": 0}"#),
        Err(CatalogError::InvalidBucketCount)
    ));
    assert!(matches!(
        CatalogConfig::from_json(r#"{"history_capacity": 0}"#),
        Err(CatalogError::InvalidCapacity)
    ));
    assert!(matches!(
        CatalogConfig::from_json("not json"),
        Err(CatalogError::Serde(_))
    ));
    assert!(matches!(
        CatalogConfig::load("/nonexistent/catalog.json"),
        Err(CatalogError::IO(_))
    ));

    let config = CatalogConfig::from_json(
        r#"{"index_buckets": 9223372036854775807, "history_capacity": 9223372036854775807}"#,
    )
    .unwrap();
    assert_eq!(config.build_history().unwrap().capacity(), usize::MAX / 2);
    assert!(matches!(
        config.build_index(),
        Err(CatalogError::InvalidBucketCount)
    ));
}
