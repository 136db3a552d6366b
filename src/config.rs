use std::str::FromStr;

use collections::{DictConfig, DictError};
use thiserror::Error;

pub const ENV_INITIAL_CAPACITY: &str = "CDICT_INITIAL_CAPACITY";
pub const ENV_GROWTH_FACTOR: &str = "CDICT_GROWTH_FACTOR";
pub const ENV_REHASH_THRESHOLD: &str = "CDICT_REHASH_THRESHOLD";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error(transparent)]
    Dict(#[from] DictError),
}

/// Driver settings, every field falls back to its default when unset.
/// Logging is configured separately through `RUST_LOG`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub dict: DictConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads settings through `lookup` instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut dict = DictConfig::default();

        if let Some(cap) = parse_var(&lookup, ENV_INITIAL_CAPACITY)? {
            dict = dict.initial_capacity(cap);
        }
        if let Some(factor) = parse_var(&lookup, ENV_GROWTH_FACTOR)? {
            dict = dict.growth_factor(factor);
        }
        if let Some(threshold) = parse_var(&lookup, ENV_REHASH_THRESHOLD)? {
            dict = dict.rehash_threshold(threshold);
        }

        dict.validate()?;
        Ok(Self { dict })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
