//! Application Configuration
//!
//! Pipeline tunables stored in TOML format, one section per stage.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefilter settings
    pub prefilter: PrefilterConfig,
    /// Spatial clustering settings
    pub cluster: ClusterConfig,
    /// Resolution settings
    pub resolver: ResolverConfig,
    /// Gazetteer database settings
    pub gazetteer: GazetteerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prefilter: PrefilterConfig::default(),
            cluster: ClusterConfig::default(),
            resolver: ResolverConfig::default(),
            gazetteer: GazetteerConfig::default(),
        }
    }
}

/// OCR log prefiltering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefilterConfig {
    /// Minimum detection confidence to keep a row (0.0 - 1.0)
    pub confidence_threshold: f64,
    /// Maximum noise characters tolerated in a raw token
    pub max_noise_chars: usize,
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.0,
            max_noise_chars: 1,
        }
    }
}

/// Spatial clustering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Smallest group of detections counted as a cluster
    pub min_cluster_size: usize,
    /// Neighbour count used for core distances
    pub min_samples: usize,
    /// Maximum mutual-reachability distance to merge, in pixels
    pub proximity_threshold: f64,
    /// Candidates shorter than this many characters are dropped
    pub min_candidate_length: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
            min_samples: 1,
            proximity_threshold: 250.0,
            min_candidate_length: 10,
        }
    }
}

/// Location resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Total gazetteer query attempts per candidate before giving up
    pub max_query_attempts: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_query_attempts: 4,
        }
    }
}

/// Gazetteer database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerConfig {
    /// Path to the SQLite gazetteer database
    pub db_path: PathBuf,
    /// Table holding named locations
    pub locations_table: String,
    /// Location name column
    pub name_column: String,
    /// Location geometry column (WKT, WGS84)
    pub geometry_column: String,
    /// Table holding the regional boundary polygon
    pub boundary_table: String,
    /// Boundary geometry column (WKT, WGS84)
    pub boundary_geometry_column: String,
    /// Maximum Levenshtein distance for a name match
    pub max_edit_distance: i64,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("gazetteer.db"),
            locations_table: "locations".to_string(),
            name_column: "name".to_string(),
            geometry_column: "geometry".to_string(),
            boundary_table: "geneva_poly".to_string(),
            boundary_geometry_column: "st_polygonize".to_string(),
            max_edit_distance: 3,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default configuration file location under the user config directory
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "ocrgeo", "ocr-geoparser")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("config.toml"))
}
