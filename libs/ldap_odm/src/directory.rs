//! The directory the mapper reads from and writes to.
//!
//! [`Directory`] is the seam to a real directory connection. [`MemoryDirectory`] is an in
//! memory implementation that behaves like a server in the ways that matter to mapping:
//! attribute names are case-insensitive, multi-valued attributes are sets with no guaranteed
//! order, and an empty replace removes the attribute.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use ldap3_proto::proto::{
    LdapAddRequest, LdapModifyRequest, LdapModifyType, LdapPartialAttribute,
    LdapSearchResultEntry,
};

use crate::prelude::*;

pub trait Directory {
    /// Fetch the single entry named by `dn`.
    fn search_base(&self, dn: &Dn) -> Result<Option<LdapSearchResultEntry>, OdmError>;

    /// Fetch `base` and every entry below it.
    fn search_subtree(&self, base: &Dn) -> Result<Vec<LdapSearchResultEntry>, OdmError>;

    fn add(&mut self, req: LdapAddRequest) -> Result<(), OdmError>;

    fn modify(&mut self, req: LdapModifyRequest) -> Result<(), OdmError>;

    fn delete(&mut self, dn: &Dn) -> Result<(), OdmError>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    dn: Dn,
    // lowercased name -> (name as first written, values)
    attrs: BTreeMap<String, (String, BTreeSet<Vec<u8>>)>,
}

impl StoredEntry {
    fn to_search_entry(&self) -> LdapSearchResultEntry {
        LdapSearchResultEntry {
            dn: self.dn.to_string(),
            attributes: self
                .attrs
                .values()
                .map(|(atype, vals)| LdapPartialAttribute {
                    atype: atype.clone(),
                    vals: vals.iter().cloned().collect(),
                })
                .collect(),
        }
    }

    fn add_values(&mut self, atype: &str, vals: Vec<Vec<u8>>) {
        let slot = self
            .attrs
            .entry(atype.to_lowercase())
            .or_insert_with(|| (atype.to_string(), BTreeSet::new()));
        slot.1.extend(vals);
    }

    fn remove_values(&mut self, atype: &str, vals: &[Vec<u8>]) {
        let key = atype.to_lowercase();
        if vals.is_empty() {
            self.attrs.remove(&key);
            return;
        }
        let now_empty = match self.attrs.get_mut(&key) {
            Some((_, set)) => {
                for v in vals {
                    set.remove(v);
                }
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.attrs.remove(&key);
        }
    }
}

/// An in memory directory. Entries are keyed by their normalised dn. The tree is not enforced,
/// so an entry may be added without its parent existing.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: BTreeMap<String, StoredEntry>,
    operations: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        MemoryDirectory::default()
    }

    /// The number of operations, reads and writes, that have been attempted.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    fn count_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a raw entry, as if it had been loaded from elsewhere. This does not count as an
    /// operation.
    pub fn insert_raw(&mut self, entry: &LdapSearchResultEntry) -> Result<(), OdmError> {
        let dn: Dn = entry.dn.parse()?;
        let mut stored = StoredEntry {
            dn,
            attrs: BTreeMap::new(),
        };
        for pa in entry.attributes.iter() {
            stored.add_values(&pa.atype, pa.vals.clone());
        }
        self.entries.insert(stored.dn.normalised(), stored);
        Ok(())
    }
}

impl Directory for MemoryDirectory {
    fn search_base(&self, dn: &Dn) -> Result<Option<LdapSearchResultEntry>, OdmError> {
        self.count_operation();
        directory_trace!(%dn, "search base");
        Ok(self
            .entries
            .get(&dn.normalised())
            .map(StoredEntry::to_search_entry))
    }

    fn search_subtree(&self, base: &Dn) -> Result<Vec<LdapSearchResultEntry>, OdmError> {
        self.count_operation();
        directory_trace!(%base, "search subtree");
        Ok(self
            .entries
            .values()
            .filter(|e| e.dn == *base || e.dn.is_descendant_of(base))
            .map(StoredEntry::to_search_entry)
            .collect())
    }

    fn add(&mut self, req: LdapAddRequest) -> Result<(), OdmError> {
        self.count_operation();
        let dn: Dn = req.dn.parse()?;
        let key = dn.normalised();
        if self.entries.contains_key(&key) {
            directory_error!(%dn, "entry already exists");
            return Err(OdmError::EntryAlreadyExists(dn.to_string()));
        }

        let mut stored = StoredEntry {
            dn,
            attrs: BTreeMap::new(),
        };
        for attr in req.attributes {
            stored.add_values(&attr.atype, attr.vals);
        }
        directory_trace!(dn = %stored.dn, "added entry");
        self.entries.insert(key, stored);
        Ok(())
    }

    fn modify(&mut self, req: LdapModifyRequest) -> Result<(), OdmError> {
        self.count_operation();
        let dn: Dn = req.dn.parse()?;
        let Some(stored) = self.entries.get_mut(&dn.normalised()) else {
            directory_error!(%dn, "no such entry to modify");
            return Err(OdmError::NoSuchEntry(dn.to_string()));
        };

        for change in req.changes {
            let LdapPartialAttribute { atype, vals } = change.modification;
            match change.operation {
                LdapModifyType::Add => stored.add_values(&atype, vals),
                LdapModifyType::Delete => stored.remove_values(&atype, &vals),
                LdapModifyType::Replace => {
                    stored.remove_values(&atype, &[]);
                    if !vals.is_empty() {
                        stored.add_values(&atype, vals);
                    }
                }
            }
        }
        directory_trace!(%dn, "modified entry");
        Ok(())
    }

    fn delete(&mut self, dn: &Dn) -> Result<(), OdmError> {
        self.count_operation();
        match self.entries.remove(&dn.normalised()) {
            Some(_) => {
                directory_trace!(%dn, "deleted entry");
                Ok(())
            }
            None => {
                directory_error!(%dn, "no such entry to delete");
                Err(OdmError::NoSuchEntry(dn.to_string()))
            }
        }
    }
}
