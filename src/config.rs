use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ConfigurationError;
use crate::threshold::ThresholdRegistry;

pub const DEFAULT_THRESHOLD_CONFIG: &str = ".threshold.json";

/// Load the threshold config at `path`.
///
/// A missing file is not an error: it yields an empty registry, which
/// disables enforcement.
pub fn load_thresholds(path: &Path) -> Result<ThresholdRegistry, ConfigurationError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no threshold config, nothing to enforce");
            return Ok(ThresholdRegistry::default());
        }
        Err(source) => {
            return Err(ConfigurationError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigurationError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let registry = parse_thresholds(&value)?;
    info!(path = %path.display(), groups = registry.len(), "loaded threshold config");

    Ok(registry)
}

/// Build a registry from an already-parsed JSON document
pub fn parse_thresholds(value: &Value) -> Result<ThresholdRegistry, ConfigurationError> {
    let map = value.as_object().ok_or(ConfigurationError::NotAnObject)?;

    let mut pairs = Vec::with_capacity(map.len());
    for (pattern, threshold) in map {
        let threshold = threshold
            .as_f64()
            .ok_or_else(|| ConfigurationError::InvalidThreshold {
                pattern: pattern.clone(),
                value: threshold.to_string(),
            })?;
        pairs.push((pattern.as_str(), threshold));
    }

    ThresholdRegistry::from_pairs(pairs)
}
