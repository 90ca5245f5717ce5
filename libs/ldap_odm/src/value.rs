//! Field values and their cardinality.
//!
//! The distinction between an absent single value and an absent multi value is part of the
//! type: a single-valued field that is absent is `FieldValue::Single(None)`, while a
//! multi-valued field that is absent is `FieldValue::Multi(vec![])`. Neither is ever
//! represented by the other.

use serde::{Deserialize, Serialize};

use crate::error::OdmError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Multi,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    Single(Option<String>),
    Multi(Vec<String>),
}

impl FieldValue {
    /// The "absent" value for a field of this cardinality.
    pub fn absent(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => FieldValue::Single(None),
            Cardinality::Multi => FieldValue::Multi(Vec::new()),
        }
    }

    /// Build a field value from the values a directory returned for `attr`. A single valued
    /// field given more than one value is an error - we never silently pick one.
    pub fn from_values(
        cardinality: Cardinality,
        attr: &str,
        mut values: Vec<String>,
    ) -> Result<Self, OdmError> {
        match cardinality {
            Cardinality::Multi => Ok(FieldValue::Multi(values)),
            Cardinality::Single => match values.len() {
                0 => Ok(FieldValue::Single(None)),
                1 => Ok(FieldValue::Single(values.pop())),
                found => Err(OdmError::CardinalityMismatch {
                    attribute: attr.to_string(),
                    found,
                }),
            },
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            FieldValue::Single(_) => Cardinality::Single,
            FieldValue::Multi(_) => Cardinality::Multi,
        }
    }

    /// The values as the directory sees them. Absent in either form yields nothing.
    pub fn values(&self) -> &[String] {
        match self {
            FieldValue::Single(Some(v)) => std::slice::from_ref(v),
            FieldValue::Single(None) => &[],
            FieldValue::Multi(vs) => vs.as_slice(),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.values().is_empty()
    }

    pub fn into_single(self) -> Option<Option<String>> {
        match self {
            FieldValue::Single(v) => Some(v),
            FieldValue::Multi(_) => None,
        }
    }

    pub fn into_multi(self) -> Option<Vec<String>> {
        match self {
            FieldValue::Multi(vs) => Some(vs),
            FieldValue::Single(_) => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Multi(value)
    }
}
