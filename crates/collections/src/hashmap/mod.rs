use thiserror::Error;

mod dict;
mod hash_table;

pub use dict::{Dict, Iter};
pub use hash_table::hash;

pub const DEFAULT_CAPACITY: usize = 8;
pub const DEFAULT_GROWTH_FACTOR: usize = 2;
pub const DEFAULT_REHASH_THRESHOLD: f64 = 0.6;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DictError {
    #[error("Couldnt allocate slot array of {requested} slots")]
    AllocFailed { requested: usize },
    #[error("Growing capacity {capacity} by {growth_factor} overflows usize")]
    CapacityOverflow {
        capacity: usize,
        growth_factor: usize,
    },
    #[error("Invalid dictionary config: {0}")]
    InvalidConfig(String),
}

/// Sizing knobs of a [`Dict`], fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictConfig {
    /// Number of slots the first table gets
    pub initial_capacity: usize,
    /// Multiplier applied to the capacity on every rehash
    pub growth_factor: usize,
    /// `(stored + deleted) / capacity` at or above which
    /// a new key triggers a rehash first
    pub rehash_threshold: f64,
}

impl Default for DictConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            rehash_threshold: DEFAULT_REHASH_THRESHOLD,
        }
    }
}

impl DictConfig {
    pub fn initial_capacity(mut self, cap: usize) -> Self {
        self.initial_capacity = cap;
        self
    }

    pub fn growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn rehash_threshold(mut self, threshold: f64) -> Self {
        self.rehash_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), DictError> {
        if self.initial_capacity == 0 {
            return Err(DictError::InvalidConfig(
                "initial_capacity must be at least 1".into(),
            ));
        }
        if self.growth_factor < 2 {
            return Err(DictError::InvalidConfig(format!(
                "growth_factor must be at least 2, got {}",
                self.growth_factor
            )));
        }
        // also rejects NaN
        if !(self.rehash_threshold > 0.0 && self.rehash_threshold < 1.0) {
            return Err(DictError::InvalidConfig(format!(
                "rehash_threshold must be in (0, 1), got {}",
                self.rehash_threshold
            )));
        }
        Ok(())
    }
}
