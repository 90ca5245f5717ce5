//! LDAP attribute descriptions. Attribute names in a directory are case-insensitive, so
//! `telephoneNumber` and `TELEPHONENUMBER` name the same attribute. [`AttrName`] keeps the
//! spelling it was declared with for output, but compares and orders by its lowercased form.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

pub const ATTR_OBJECTCLASS: &str = "objectClass";
pub const OBJECTCLASS_TOP: &str = "top";

lazy_static! {
    /// A keystring (RFC 4512 `descr`) or a numeric OID, optionally followed by options.
    pub static ref ATTR_NAME_RE: Regex = {
        #[allow(clippy::expect_used)]
        Regex::new("^([A-Za-z][A-Za-z0-9-]*|[0-9]+(\\.[0-9]+)*)(;[A-Za-z0-9-]+)*$")
            .expect("Invalid attribute name regex found")
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttrName {
    name: String,
    key: String,
}

impl AttrName {
    pub fn new(name: &str) -> Result<Self, DescriptorError> {
        if ATTR_NAME_RE.is_match(name) {
            Ok(AttrName {
                name: name.to_string(),
                key: name.to_lowercase(),
            })
        } else {
            Err(DescriptorError::InvalidAttributeName(name.to_string()))
        }
    }

    /// The name as it was declared.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The lowercased form used for comparison.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matches(&self, other: &str) -> bool {
        self.key == other.to_lowercase()
    }

    pub fn is_objectclass(&self) -> bool {
        self.matches(ATTR_OBJECTCLASS)
    }
}

impl PartialEq for AttrName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for AttrName {}

impl Hash for AttrName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}

impl PartialOrd for AttrName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl AsRef<str> for AttrName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for AttrName {
    type Error = DescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AttrName::new(&value)
    }
}

impl TryFrom<&str> for AttrName {
    type Error = DescriptorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AttrName::new(value)
    }
}

impl From<AttrName> for String {
    fn from(value: AttrName) -> Self {
        value.name
    }
}
