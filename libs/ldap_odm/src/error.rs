use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/* ===== errors ===== */

/// Problems found while building an [`EntryDescriptor`]. These are always raised when a type
/// is registered, never while mapping an individual entry.
///
/// [`EntryDescriptor`]: ../descriptor/struct.EntryDescriptor.html
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorError {
    NoObjectClass,
    DuplicateObjectClass(String),
    NoIdentity,
    MultipleIdentity(Vec<String>),
    IdentityMappedAsAttribute(String),
    DuplicateAttribute(String),
    DuplicateField(String),
    InvalidAttributeName(String),
    ReservedAttribute(String),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut output = format!("{:?}", self);
        if let Some(msg) = self.message() {
            output += &format!(" - {}", msg);
        };
        f.write_str(&output)
    }
}

impl std::error::Error for DescriptorError {}

impl DescriptorError {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NoObjectClass => Some("At least one object class must be declared."),
            Self::NoIdentity => Some("Exactly one field must hold the distinguished name."),
            Self::MultipleIdentity(_) => {
                Some("Only one field may hold the distinguished name.")
            }
            Self::ReservedAttribute(_) => {
                Some("This attribute is managed by the mapper and can not be mapped to a field.")
            }
            Self::DuplicateObjectClass(_)
            | Self::IdentityMappedAsAttribute(_)
            | Self::DuplicateAttribute(_)
            | Self::DuplicateField(_)
            | Self::InvalidAttributeName(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OdmError {
    // Data errors raised while mapping a single entry.
    CardinalityMismatch {
        attribute: String,
        found: usize,
    },
    MissingIdentity(String),
    ObjectClassMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    InvalidDn(String),
    InvalidValueEncoding(String),
    UnknownField(String),
    // Setup errors.
    InvalidDescriptor(DescriptorError),
    UnregisteredType(String),
    InvalidConfig(String),
    FsError,
    // Raised by a directory implementation.
    EntryAlreadyExists(String),
    NoSuchEntry(String),
}

impl Display for OdmError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut output = format!("{:?}", self)
            .split("::")
            .last()
            .unwrap_or("")
            .to_string();

        if let Some(msg) = self.message() {
            output += &format!(" - {}", msg);
        };
        f.write_str(&output)
    }
}

impl std::error::Error for OdmError {}

impl From<DescriptorError> for OdmError {
    fn from(value: DescriptorError) -> Self {
        OdmError::InvalidDescriptor(value)
    }
}

impl OdmError {
    /// Return the message associated with the error if there is one.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::CardinalityMismatch { .. } => Some(
                "The attribute carries a number of values that the mapped field can not hold."
                    .into(),
            ),
            Self::MissingIdentity(_) => {
                Some("The entry has no distinguished name and can not be written.".into())
            }
            Self::ObjectClassMismatch { .. } => Some(
                "The directory entry does not carry every object class of the mapped type.".into(),
            ),
            Self::InvalidDn(_) => None,
            Self::InvalidValueEncoding(_) => Some("The attribute value is not valid UTF-8.".into()),
            Self::UnknownField(_) => None,
            Self::InvalidDescriptor(_) => None,
            Self::UnregisteredType(_) => {
                Some("The entry type must be registered with the mapper before use.".into())
            }
            Self::InvalidConfig(_) => None,
            Self::FsError => None,
            Self::EntryAlreadyExists(_) => None,
            Self::NoSuchEntry(_) => None,
        }
    }
}
