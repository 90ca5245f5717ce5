//! Mapper configuration, as read from a toml file such as:
//!
//! ```toml
//! object_class_policy = "filter"
//! log_unmapped_attributes = false
//! max_values_per_attribute = 1024
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OdmError;

/// What to do with a search result whose object classes do not include every class declared
/// by the mapped type.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClassPolicy {
    /// Fail the whole mapping operation.
    #[default]
    Reject,
    /// Skip the entry when mapping a set of search results. Mapping a single entry still fails.
    Filter,
}

#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MapperConfig {
    #[serde(default)]
    pub object_class_policy: ObjectClassPolicy,
    /// Emit a warn event naming directory attributes that have no mapped field. They are
    /// ignored either way.
    #[serde(default = "default_log_unmapped")]
    pub log_unmapped_attributes: bool,
    /// Upper bound on the number of values a single attribute may carry, read or write.
    #[serde(default)]
    pub max_values_per_attribute: Option<usize>,
}

fn default_log_unmapped() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            object_class_policy: ObjectClassPolicy::default(),
            log_unmapped_attributes: default_log_unmapped(),
            max_values_per_attribute: None,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, OdmError> {
        let config: MapperConfig = toml::from_str(contents).map_err(|e| {
            error!(?e, "unable to parse mapper config");
            OdmError::InvalidConfig(e.to_string())
        })?;

        if config.max_values_per_attribute == Some(0) {
            error!("max_values_per_attribute must be greater than zero");
            return Err(OdmError::InvalidConfig(
                "max_values_per_attribute must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, OdmError> {
        let mut f = File::open(config_path.as_ref()).map_err(|e| {
            error!(?e, path = ?config_path.as_ref(), "unable to open mapper config");
            OdmError::FsError
        })?;

        let mut contents = String::new();
        f.read_to_string(&mut contents).map_err(|e| {
            error!(?e, path = ?config_path.as_ref(), "unable to read mapper config");
            OdmError::FsError
        })?;

        Self::from_toml_str(&contents)
    }
}
