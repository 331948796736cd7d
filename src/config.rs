// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

pub const TABLE_SIZE_DEFAULT: usize = 8192;
pub const TABLE_SIZE_MIN: usize = 1;
pub const TABLE_SIZE_MAX: usize = 1 << 20;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("malformed material config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("table_size {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("table_size {size} outside [{min}, {max}]")]
    OutOfRange { size: usize, min: usize, max: usize },
}

/// Per-thread material table settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Number of entries in each thread's material table.
    pub table_size: usize,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        MaterialConfig { table_size: TABLE_SIZE_DEFAULT }
    }
}

impl MaterialConfig {
    pub fn from_json(s: &str) -> Result<MaterialConfig, ConfigError> {
        let config: MaterialConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size < TABLE_SIZE_MIN || self.table_size > TABLE_SIZE_MAX {
            return Err(ConfigError::OutOfRange {
                size: self.table_size,
                min: TABLE_SIZE_MIN,
                max: TABLE_SIZE_MAX,
            });
        }
        if !self.table_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo(self.table_size));
        }
        Ok(())
    }
}
