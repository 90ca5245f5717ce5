//! Entry level operations against a [`Directory`], combining it with an [`EntryMapper`].

use crate::directory::Directory;
use crate::mapper::EntryMapper;
use crate::prelude::*;

pub struct OdmTemplate<D: Directory> {
    mapper: EntryMapper,
    directory: D,
}

impl<D: Directory> OdmTemplate<D> {
    pub fn new(mapper: EntryMapper, directory: D) -> Self {
        OdmTemplate { mapper, directory }
    }

    pub fn mapper(&self) -> &EntryMapper {
        &self.mapper
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn into_directory(self) -> D {
        self.directory
    }

    /// Create `entry` in the directory. The request is fully generated, and so the identity is
    /// checked, before the directory is contacted.
    #[instrument(level = "debug", skip_all)]
    pub fn create<T: DirectoryEntry>(&mut self, entry: &T) -> Result<(), OdmError> {
        let req = self.mapper.to_add_request(entry)?;
        self.directory.add(req)
    }

    /// Replace every mapped attribute of the existing directory entry with the values held by
    /// `entry`.
    #[instrument(level = "debug", skip_all)]
    pub fn update<T: DirectoryEntry>(&mut self, entry: &T) -> Result<(), OdmError> {
        let req = self.mapper.to_modify_request(entry)?;
        self.directory.modify(req)
    }

    #[instrument(level = "debug", skip_all)]
    pub fn delete<T: DirectoryEntry>(&mut self, entry: &T) -> Result<(), OdmError> {
        let desc = self.mapper.descriptor::<T>()?;
        let dn = entry.dn().ok_or_else(|| {
            mapping_error!(entry_type = desc.entry_type(), "entry has no distinguished name");
            OdmError::MissingIdentity(desc.entry_type().to_string())
        })?;
        self.directory.delete(dn)
    }

    pub fn find_by_dn<T: DirectoryEntry>(&self, dn: &Dn) -> Result<Option<T>, OdmError> {
        // Fail on an unregistered type before searching.
        self.mapper.descriptor::<T>()?;
        self.directory
            .search_base(dn)?
            .map(|entry| self.mapper.map_from_entry(&entry))
            .transpose()
    }

    /// Every entry of type `T` at or below `base`. Entries of other types are handled by the
    /// configured object class policy.
    pub fn find_all<T: DirectoryEntry>(&self, base: &Dn) -> Result<Vec<T>, OdmError> {
        self.mapper.descriptor::<T>()?;
        let entries = self.directory.search_subtree(base)?;
        self.mapper.map_search_results(&entries)
    }
}
