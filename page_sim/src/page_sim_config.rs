use static_assertions::const_assert;
use thiserror::Error;

use crate::util::arena_list::ArenaListError;

pub const DEFAULT_TOTAL_PAGES: usize = 100;
pub const DEFAULT_MAX_PROGRAMS: usize = 10;
pub const DEFAULT_MAX_SIZE: usize = 1000;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_RANGE_CAPACITY: usize = 20;

const_assert!(DEFAULT_PAGE_SIZE > 0);
const_assert!(DEFAULT_TOTAL_PAGES > 0);
const_assert!(DEFAULT_RANGE_CAPACITY > 0);
const_assert!(DEFAULT_MAX_SIZE <= DEFAULT_TOTAL_PAGES * DEFAULT_PAGE_SIZE);

const ENV_TOTAL_PAGES: &str = "PAGE_SIM_TOTAL_PAGES";
const ENV_MAX_PROGRAMS: &str = "PAGE_SIM_MAX_PROGRAMS";
const ENV_MAX_SIZE: &str = "PAGE_SIM_MAX_SIZE";
const ENV_PAGE_SIZE: &str = "PAGE_SIM_PAGE_SIZE";
const ENV_RANGE_CAPACITY: &str = "PAGE_SIM_RANGE_CAPACITY";
const ENV_COALESCE: &str = "PAGE_SIM_COALESCE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("could not parse {name}={value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} has to be greater than zero")]
    Zero(&'static str),

    /// The initial free range did not fit into the free list
    #[error("could not set up the free list: {0}")]
    Store(#[from] ArenaListError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSimConfig {
    /// Total amount of pages that can be handed out
    pub total_pages: usize,

    /// Amount of program slots (valid ids are `0..max_programs`)
    pub max_programs: usize,

    /// Maximum amount of bytes a program can grow to
    pub max_size: usize,

    /// Bytes per page
    pub page_size: usize,

    /// Amount of records every range store can hold
    pub range_capacity: usize,

    /// Merge adjacent ranges when pages are given back to the free list
    pub coalesce_free_ranges: bool,
}

impl Default for PageSimConfig {
    fn default() -> Self {
        Self {
            total_pages: DEFAULT_TOTAL_PAGES,
            max_programs: DEFAULT_MAX_PROGRAMS,
            max_size: DEFAULT_MAX_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            range_capacity: DEFAULT_RANGE_CAPACITY,
            coalesce_free_ranges: false,
        }
    }
}

impl PageSimConfig {
    /// Reads the configuration from `PAGE_SIM_*` environment variables.
    ///
    /// Unset variables keep their default value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` but the variables are resolved by `lookup`
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let read = |name: &'static str, target: &mut usize| -> Result<(), ConfigError> {
            if let Some(value) = lookup(name) {
                *target = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue { name, value })?;
            }
            Ok(())
        };

        read(ENV_TOTAL_PAGES, &mut config.total_pages)?;
        read(ENV_MAX_PROGRAMS, &mut config.max_programs)?;
        read(ENV_MAX_SIZE, &mut config.max_size)?;
        read(ENV_PAGE_SIZE, &mut config.page_size)?;
        read(ENV_RANGE_CAPACITY, &mut config.range_capacity)?;

        if let Some(value) = lookup(ENV_COALESCE) {
            config.coalesce_free_ranges = match value.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_COALESCE,
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_pages == 0 {
            return Err(ConfigError::Zero("total_pages"));
        }
        if self.max_programs == 0 {
            return Err(ConfigError::Zero("max_programs"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        if self.range_capacity == 0 {
            return Err(ConfigError::Zero("range_capacity"));
        }

        Ok(())
    }
}
