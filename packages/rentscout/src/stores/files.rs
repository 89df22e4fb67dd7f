//! Flat-file cache and output artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::types::listing::{EnrichedListing, RawListing, TravelTimeIndex};

/// Wrapper matching the cache artifact shape, `{"properties": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PropertiesFile {
    properties: Vec<RawListing>,
}

/// Disk-backed store for the two cache artifacts and the output artifact.
///
/// Each document is written whole (pretty-printed, 2-space indent) so runs
/// can restart from any stage and the files stay human-inspectable. There is
/// no versioning and no staleness detection: a load returns whatever was last
/// written for that city, and freshness is the caller's call.
pub struct FileStore {
    cache_dir: PathBuf,
    output_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    fn listings_path(&self, city: &str) -> PathBuf {
        self.cache_dir.join(format!("{city}.json"))
    }

    fn travel_times_path(&self, city: &str) -> PathBuf {
        self.cache_dir.join(format!("{city}_travel_time.json"))
    }

    fn output_path(&self, city: &str) -> PathBuf {
        self.output_dir.join(format!("{city}.json"))
    }

    /// Persist the fetch stage: qualifying listings plus their travel times.
    pub fn save(
        &self,
        city: &str,
        listings: &[RawListing],
        travel_times: &TravelTimeIndex,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir)?;

        let doc = PropertiesFile {
            properties: listings.to_vec(),
        };
        write_pretty(&self.listings_path(city), &doc)?;
        write_pretty(&self.travel_times_path(city), travel_times)?;

        debug!(city = %city, listings = listings.len(), "cache written");
        Ok(())
    }

    /// Load the fetch-stage checkpoint.
    pub fn load(&self, city: &str) -> Result<(Vec<RawListing>, TravelTimeIndex), StoreError> {
        let doc: PropertiesFile = read_json(&self.listings_path(city))?;
        let travel_times: TravelTimeIndex = read_json(&self.travel_times_path(city))?;
        Ok((doc.properties, travel_times))
    }

    /// Overwrite the output artifact with the full enriched collection.
    pub fn save_enriched(
        &self,
        city: &str,
        listings: &[EnrichedListing],
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.output_dir)?;
        write_pretty(&self.output_path(city), &listings)?;
        debug!(city = %city, listings = listings.len(), "output written");
        Ok(())
    }

    /// Load the enriched output artifact.
    pub fn load_enriched(&self, city: &str) -> Result<Vec<EnrichedListing>, StoreError> {
        read_json(&self.output_path(city))
    }
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
