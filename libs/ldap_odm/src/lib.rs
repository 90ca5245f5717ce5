//! Object-directory mapping. This maps plain Rust types onto LDAP directory entries: each type
//! declares an [`EntryDescriptor`](descriptor::EntryDescriptor) naming its object classes, its
//! distinguished name field, and the attribute and cardinality of each other field. An
//! [`EntryMapper`](mapper::EntryMapper) validates those declarations at startup and then
//! converts between values and LDAP protocol messages.

#![warn(unused_extern_crates)]
// Enable some groups of clippy lints.
#![deny(clippy::suspicious)]
#![deny(clippy::perf)]
// Specific lints to enforce.
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::manual_let_else)]
#![allow(clippy::unreachable)]

#[macro_use]
extern crate tracing;
#[macro_use]
extern crate lazy_static;

pub mod attribute;
pub mod config;
pub mod descriptor;
pub mod directory;
pub mod dn;
pub mod entry;
pub mod error;
pub mod mapper;
pub mod person;
pub mod template;
pub mod value;

/// A prelude of imports that should be imported by all other ldap_odm modules to
/// help make imports cleaner.
pub mod prelude {
    pub use crate::attribute::AttrName;
    pub use crate::descriptor::{EntryDescriptor, FieldDescriptor};
    pub use crate::dn::{Dn, Rdn};
    pub use crate::entry::DirectoryEntry;
    pub use crate::error::{DescriptorError, OdmError};
    pub use crate::value::{Cardinality, FieldValue};
    pub use sketching::{
        directory_error, directory_trace, mapping_error, mapping_info, mapping_trace,
        mapping_warn, schema_error, schema_info, tagged_event, EventTag,
    };
}
