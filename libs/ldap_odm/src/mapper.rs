//! The mapping engine. An [`EntryMapper`] holds the validated descriptor of every registered
//! entry type, and converts between those types and LDAP protocol messages.
//!
//! Reading takes a search result entry, which is a dn plus an unordered collection of partial
//! attributes, and assigns each declared field according to its cardinality. Writing reads the
//! identity and each declared field back out and produces an add or modify request tagged with
//! the declared object classes.

use std::collections::BTreeMap;

use ldap3_proto::proto::{
    LdapAddRequest, LdapAttribute, LdapModify, LdapModifyRequest, LdapModifyType,
    LdapPartialAttribute, LdapSearchResultEntry,
};

use crate::attribute::ATTR_OBJECTCLASS;
use crate::config::{MapperConfig, ObjectClassPolicy};
use crate::prelude::*;

/// Partial attributes of one search result, merged by case-insensitive attribute name.
struct MergedAttributes<'a> {
    attrs: BTreeMap<String, (&'a str, Vec<&'a [u8]>)>,
}

impl<'a> MergedAttributes<'a> {
    fn new(entry: &'a LdapSearchResultEntry) -> Self {
        let mut attrs: BTreeMap<String, (&'a str, Vec<&'a [u8]>)> = BTreeMap::new();
        for pa in entry.attributes.iter() {
            let slot = attrs
                .entry(pa.atype.to_lowercase())
                .or_insert_with(|| (pa.atype.as_str(), Vec::with_capacity(pa.vals.len())));
            slot.1.extend(pa.vals.iter().map(|v| v.as_slice()));
        }
        MergedAttributes { attrs }
    }

    fn get(&self, attr: &AttrName) -> &[&'a [u8]] {
        self.attrs
            .get(attr.key())
            .map(|(_, vals)| vals.as_slice())
            .unwrap_or(&[])
    }

    fn get_utf8(&self, attr: &AttrName) -> Result<Vec<String>, OdmError> {
        self.get(attr)
            .iter()
            .map(|v| {
                String::from_utf8(v.to_vec()).map_err(|_| {
                    mapping_error!(attr = %attr, "attribute value is not valid utf-8");
                    OdmError::InvalidValueEncoding(attr.to_string())
                })
            })
            .collect()
    }

    fn object_classes(&self) -> Result<Vec<String>, OdmError> {
        let oc = AttrName::new(ATTR_OBJECTCLASS)?;
        self.get_utf8(&oc)
    }

    /// Attribute names present in the entry that the descriptor does not map.
    fn unmapped(&self, desc: &EntryDescriptor) -> Vec<&'a str> {
        self.attrs
            .iter()
            .filter(|(key, _)| key.as_str() != "objectclass" && desc.attribute(key).is_none())
            .map(|(_, (atype, _))| *atype)
            .collect()
    }
}

pub struct EntryMapper {
    config: MapperConfig,
    descriptors: BTreeMap<&'static str, EntryDescriptor>,
}

impl Default for EntryMapper {
    fn default() -> Self {
        EntryMapper::new(MapperConfig::default())
    }
}

impl EntryMapper {
    pub fn new(config: MapperConfig) -> Self {
        EntryMapper {
            config,
            descriptors: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Build and validate the descriptor for `T`. This is where every declaration error of a
    /// type is reported, so it should be done once at startup for each type in use.
    pub fn register<T: DirectoryEntry>(&mut self) -> Result<(), OdmError> {
        if self.descriptors.contains_key(T::ENTRY_TYPE) {
            return Ok(());
        }
        let desc = T::describe().inspect_err(|e| {
            schema_error!(entry_type = T::ENTRY_TYPE, ?e, "unable to register entry type");
        })?;
        schema_info!(entry_type = T::ENTRY_TYPE, "registered entry type");
        self.descriptors.insert(T::ENTRY_TYPE, desc);
        Ok(())
    }

    /// Consuming form of [`register`](Self::register), for building a mapper in one expression.
    pub fn with_entry<T: DirectoryEntry>(mut self) -> Result<Self, OdmError> {
        self.register::<T>()?;
        Ok(self)
    }

    pub fn descriptor<T: DirectoryEntry>(&self) -> Result<&EntryDescriptor, OdmError> {
        self.descriptors.get(T::ENTRY_TYPE).ok_or_else(|| {
            mapping_error!(entry_type = T::ENTRY_TYPE, "entry type is not registered");
            OdmError::UnregisteredType(T::ENTRY_TYPE.to_string())
        })
    }

    fn check_value_count(&self, attr: &AttrName, found: usize) -> Result<(), OdmError> {
        match self.config.max_values_per_attribute {
            Some(max) if found > max => {
                mapping_error!(attr = %attr, found, max, "attribute exceeds the value limit");
                Err(OdmError::CardinalityMismatch {
                    attribute: attr.to_string(),
                    found,
                })
            }
            _ => Ok(()),
        }
    }

    /// The mismatch error for `merged`, if it lacks any declared object class.
    fn object_class_mismatch(
        desc: &EntryDescriptor,
        merged: &MergedAttributes,
    ) -> Result<Option<OdmError>, OdmError> {
        let found = merged.object_classes()?;
        if desc.requires_object_classes(&found) {
            Ok(None)
        } else {
            Ok(Some(OdmError::ObjectClassMismatch {
                expected: desc.object_classes().to_vec(),
                found,
            }))
        }
    }

    fn populate<T: DirectoryEntry>(
        &self,
        desc: &EntryDescriptor,
        dn: Dn,
        merged: &MergedAttributes,
    ) -> Result<T, OdmError> {
        let mut entry = T::default();
        entry.set_dn(dn);

        for fd in desc.attributes() {
            let values = merged.get_utf8(fd.attribute())?;
            self.check_value_count(fd.attribute(), values.len())?;
            let value = FieldValue::from_values(fd.cardinality(), fd.attribute().as_str(), values)
                .inspect_err(|_| {
                    mapping_error!(
                        entry_type = desc.entry_type(),
                        attr = %fd.attribute(),
                        "multiple values returned for a single valued attribute"
                    );
                })?;
            entry.set(fd.field(), value)?;
        }

        if self.config.log_unmapped_attributes {
            let unmapped = merged.unmapped(desc);
            if !unmapped.is_empty() {
                mapping_warn!(
                    entry_type = desc.entry_type(),
                    ?unmapped,
                    "ignoring unmapped attributes"
                );
            }
        }

        Ok(entry)
    }

    /// Map a single search result entry into `T`.
    ///
    /// An entry missing any of the declared object classes is always an error here, regardless
    /// of the configured policy, since there is nothing to filter.
    #[instrument(level = "debug", skip_all)]
    pub fn map_from_entry<T: DirectoryEntry>(
        &self,
        entry: &LdapSearchResultEntry,
    ) -> Result<T, OdmError> {
        let desc = self.descriptor::<T>()?;
        let dn: Dn = entry.dn.parse()?;
        let merged = MergedAttributes::new(entry);

        if let Some(e) = Self::object_class_mismatch(desc, &merged)? {
            mapping_error!(entry_type = desc.entry_type(), %dn, "entry does not carry the declared object classes");
            return Err(e);
        }

        self.populate(desc, dn, &merged)
    }

    /// Map a set of search results into `T`, applying the configured [`ObjectClassPolicy`] to
    /// entries that lack the declared object classes.
    #[instrument(level = "debug", skip_all)]
    pub fn map_search_results<T: DirectoryEntry>(
        &self,
        entries: &[LdapSearchResultEntry],
    ) -> Result<Vec<T>, OdmError> {
        let desc = self.descriptor::<T>()?;
        let mut mapped = Vec::with_capacity(entries.len());

        for entry in entries {
            let dn: Dn = entry.dn.parse()?;
            let merged = MergedAttributes::new(entry);

            if let Some(e) = Self::object_class_mismatch(desc, &merged)? {
                match self.config.object_class_policy {
                    ObjectClassPolicy::Reject => {
                        mapping_error!(entry_type = desc.entry_type(), %dn, "entry does not carry the declared object classes");
                        return Err(e);
                    }
                    ObjectClassPolicy::Filter => {
                        mapping_trace!(entry_type = desc.entry_type(), %dn, "skipping entry without the declared object classes");
                        continue;
                    }
                }
            }

            mapped.push(self.populate(desc, dn, &merged)?);
        }

        mapping_info!(
            entry_type = desc.entry_type(),
            returned = entries.len(),
            mapped = mapped.len(),
            "mapped search results"
        );
        Ok(mapped)
    }

    /// Read the identity and every declared attribute out of `entry`. The object class
    /// attribute is first, then the declared attributes in declaration order, including
    /// absent ones as empty attributes.
    fn collect<T: DirectoryEntry>(
        &self,
        entry: &T,
    ) -> Result<(&EntryDescriptor, Dn, Vec<LdapPartialAttribute>), OdmError> {
        let desc = self.descriptor::<T>()?;

        // This must happen before anything else, and before any directory is contacted.
        let dn = entry.dn().cloned().ok_or_else(|| {
            mapping_error!(entry_type = desc.entry_type(), "entry has no distinguished name");
            OdmError::MissingIdentity(desc.entry_type().to_string())
        })?;

        let mut attributes = Vec::with_capacity(desc.attributes().count() + 1);
        attributes.push(LdapPartialAttribute {
            atype: ATTR_OBJECTCLASS.to_string(),
            vals: desc
                .object_classes()
                .iter()
                .map(|oc| oc.as_bytes().to_vec())
                .collect(),
        });

        for fd in desc.attributes() {
            let value = entry.get(fd.field()).ok_or_else(|| {
                mapping_error!(entry_type = desc.entry_type(), field = fd.field(), "declared field is not readable");
                OdmError::UnknownField(fd.field().to_string())
            })?;

            if value.cardinality() != fd.cardinality() {
                mapping_error!(
                    entry_type = desc.entry_type(),
                    attr = %fd.attribute(),
                    "field value does not match the declared cardinality"
                );
                return Err(OdmError::CardinalityMismatch {
                    attribute: fd.attribute().to_string(),
                    found: value.values().len(),
                });
            }
            self.check_value_count(fd.attribute(), value.values().len())?;

            attributes.push(LdapPartialAttribute {
                atype: fd.attribute().to_string(),
                vals: value
                    .values()
                    .iter()
                    .map(|v| v.as_bytes().to_vec())
                    .collect(),
            });
        }

        Ok((desc, dn, attributes))
    }

    /// Serialise `entry` as the search result a directory would return for it. Absent
    /// attributes are omitted.
    pub fn to_search_entry<T: DirectoryEntry>(
        &self,
        entry: &T,
    ) -> Result<LdapSearchResultEntry, OdmError> {
        let (_, dn, attributes) = self.collect(entry)?;
        Ok(LdapSearchResultEntry {
            dn: dn.to_string(),
            attributes: attributes
                .into_iter()
                .filter(|pa| !pa.vals.is_empty())
                .collect(),
        })
    }

    #[instrument(level = "debug", skip_all)]
    pub fn to_add_request<T: DirectoryEntry>(&self, entry: &T) -> Result<LdapAddRequest, OdmError> {
        let (desc, dn, attributes) = self.collect(entry)?;
        mapping_trace!(entry_type = desc.entry_type(), %dn, "generating add request");
        Ok(LdapAddRequest {
            dn: dn.to_string(),
            attributes: attributes
                .into_iter()
                .filter(|pa| !pa.vals.is_empty())
                .map(|pa| LdapAttribute {
                    atype: pa.atype,
                    vals: pa.vals,
                })
                .collect(),
        })
    }

    /// Generate a modify request that replaces every declared attribute. An absent attribute
    /// becomes an empty replace, which removes it from the directory entry.
    #[instrument(level = "debug", skip_all)]
    pub fn to_modify_request<T: DirectoryEntry>(
        &self,
        entry: &T,
    ) -> Result<LdapModifyRequest, OdmError> {
        let (desc, dn, attributes) = self.collect(entry)?;
        mapping_trace!(entry_type = desc.entry_type(), %dn, "generating modify request");
        Ok(LdapModifyRequest {
            dn: dn.to_string(),
            changes: attributes
                .into_iter()
                .map(|modification| LdapModify {
                    operation: LdapModifyType::Replace,
                    modification,
                })
                .collect(),
        })
    }
}
