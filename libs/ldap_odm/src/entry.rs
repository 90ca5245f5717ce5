//! The contract a type must satisfy to be mapped to and from directory entries.

use crate::descriptor::EntryDescriptor;
use crate::dn::Dn;
use crate::error::OdmError;
use crate::value::FieldValue;

/// A type that is a projection of a directory entry.
///
/// Implementors are plain data. The mapping engine creates them with [`Default`] when reading
/// and then assigns the identity and each declared field through [`set_dn`] and [`set`]. When
/// writing, the engine reads them back through [`dn`] and [`get`].
///
/// [`set_dn`]: DirectoryEntry::set_dn
/// [`set`]: DirectoryEntry::set
/// [`dn`]: DirectoryEntry::dn
/// [`get`]: DirectoryEntry::get
pub trait DirectoryEntry: Default {
    /// A unique name for this entry type, used to register and look up its descriptor.
    const ENTRY_TYPE: &'static str;

    /// Declare the mapping for this type. This is called once when the type is registered
    /// with a mapper, and any error in the declaration is reported there.
    fn describe() -> Result<EntryDescriptor, OdmError>;

    fn dn(&self) -> Option<&Dn>;

    fn set_dn(&mut self, dn: Dn);

    /// Read a mapped field. Returns `None` only when `field` is not a mapped field of this type.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Replace a mapped field wholesale.
    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), OdmError>;
}
