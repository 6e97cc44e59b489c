//! # Lens Configuration
//!
//! Tunable defaults for lens operations. Every field has a default, so an
//! empty YAML document is a valid config.
//!
//! ```yaml
//! dist_tol: 0.001
//! project_tol: 0.0001
//! parallel: true
//! min_parallel_batch: 16
//! random_seed: 42
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PreconditionError};
use crate::primitives::Tolerance;

/// Default tolerance for boundary distances.
pub const DEFAULT_DIST_TOL: f64 = 1e-3;

/// Default tolerance for boundary projections.
pub const DEFAULT_PROJECT_TOL: f64 = 1e-4;

/// Default batch size below which work stays on the calling thread.
pub const DEFAULT_MIN_PARALLEL_BATCH: usize = 16;

/// Configuration shared by every operation of a lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Tolerance used by `dist` and `adj_matrix`.
    pub dist_tol: f64,
    /// Tolerance used by point, random, and lexicographic projectors.
    pub project_tol: f64,
    /// Fan batch work out on the rayon pool.
    pub parallel: bool,
    /// Batches with fewer items than this run sequentially.
    pub min_parallel_batch: usize,
    /// Seed for random projectors. `None` draws from the thread RNG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            dist_tol: DEFAULT_DIST_TOL,
            project_tol: DEFAULT_PROJECT_TOL,
            parallel: true,
            min_parallel_batch: DEFAULT_MIN_PARALLEL_BATCH,
            random_seed: None,
        }
    }
}

impl LensConfig {
    /// Parse and validate a config from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both tolerances are valid.
    pub fn validate(&self) -> Result<(), PreconditionError> {
        self.dist_tolerance()?;
        self.project_tolerance()?;
        Ok(())
    }

    /// The distance tolerance as a validated [`Tolerance`].
    pub fn dist_tolerance(&self) -> Result<Tolerance, PreconditionError> {
        Tolerance::new(self.dist_tol)
    }

    /// The projection tolerance as a validated [`Tolerance`].
    pub fn project_tolerance(&self) -> Result<Tolerance, PreconditionError> {
        Tolerance::new(self.project_tol)
    }

    /// Whether a batch of `len` items should run on the rayon pool.
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.parallel && len >= self.min_parallel_batch.max(2)
    }
}
