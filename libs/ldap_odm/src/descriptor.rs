//! Entry descriptors declare, once per mapped type, how the fields of that type correspond to
//! a directory entry: which object classes the entry carries, which field holds the
//! distinguished name, and which attribute each remaining field maps to along with its
//! [`Cardinality`].
//!
//! Descriptors are only created through [`EntryDescriptorBuilder::build`], which rejects any
//! inconsistent declaration. A descriptor that exists is valid.

use std::collections::BTreeSet;

use crate::prelude::*;

/// A single mapped field and the attribute that backs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    field: String,
    attribute: AttrName,
    cardinality: Cardinality,
}

impl FieldDescriptor {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn attribute(&self) -> &AttrName {
        &self.attribute
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

#[derive(Debug, Clone)]
pub struct EntryDescriptor {
    entry_type: String,
    object_classes: Vec<String>,
    identity: String,
    fields: Vec<FieldDescriptor>,
}

impl EntryDescriptor {
    pub fn builder(entry_type: &str) -> EntryDescriptorBuilder {
        EntryDescriptorBuilder {
            entry_type: entry_type.to_string(),
            object_classes: Vec::new(),
            identities: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// The object classes in the order they were declared.
    pub fn object_classes(&self) -> &[String] {
        &self.object_classes
    }

    pub fn identity_field(&self) -> &str {
        &self.identity
    }

    /// The mapped attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Find the field mapped to a directory attribute. The lookup is case-insensitive.
    pub fn attribute(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|fd| fd.attribute.matches(name))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|fd| fd.field == name)
    }

    /// The declared object classes that are not present in `found`.
    pub fn missing_object_classes<S: AsRef<str>>(&self, found: &[S]) -> Vec<String> {
        let found: BTreeSet<String> = found.iter().map(|s| s.as_ref().to_lowercase()).collect();
        self.object_classes
            .iter()
            .filter(|oc| !found.contains(&oc.to_lowercase()))
            .cloned()
            .collect()
    }

    /// True if `found` includes every declared object class.
    pub fn requires_object_classes<S: AsRef<str>>(&self, found: &[S]) -> bool {
        self.missing_object_classes(found).is_empty()
    }
}

pub struct EntryDescriptorBuilder {
    entry_type: String,
    object_classes: Vec<String>,
    identities: Vec<String>,
    fields: Vec<(String, String, Cardinality)>,
}

impl EntryDescriptorBuilder {
    pub fn object_class(mut self, oc: &str) -> Self {
        self.object_classes.push(oc.to_string());
        self
    }

    pub fn object_classes(mut self, ocs: &[&str]) -> Self {
        self.object_classes.extend(ocs.iter().map(|s| s.to_string()));
        self
    }

    /// Declare the field holding the distinguished name. Declaring more than one is an error
    /// reported by [`build`](Self::build).
    pub fn identity(mut self, field: &str) -> Self {
        self.identities.push(field.to_string());
        self
    }

    pub fn single(mut self, field: &str, attribute: &str) -> Self {
        self.fields
            .push((field.to_string(), attribute.to_string(), Cardinality::Single));
        self
    }

    pub fn multi(mut self, field: &str, attribute: &str) -> Self {
        self.fields
            .push((field.to_string(), attribute.to_string(), Cardinality::Multi));
        self
    }

    pub fn build(self) -> Result<EntryDescriptor, DescriptorError> {
        let entry_type = self.entry_type;
        check_object_classes(&entry_type, &self.object_classes)?;

        let identity = match self.identities.as_slice() {
            [] => {
                schema_error!(%entry_type, "entry type declares no identity field");
                return Err(DescriptorError::NoIdentity);
            }
            [one] => one.clone(),
            many => {
                schema_error!(%entry_type, identities = ?many, "entry type declares multiple identity fields");
                return Err(DescriptorError::MultipleIdentity(many.to_vec()));
            }
        };

        let mut seen_attrs: BTreeSet<AttrName> = BTreeSet::new();
        let mut seen_fields: BTreeSet<&str> = BTreeSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for (field, attr, cardinality) in self.fields.iter() {
            let attribute = AttrName::new(attr).inspect_err(|_| {
                schema_error!(%entry_type, %attr, "invalid attribute name");
            })?;

            if attribute.is_objectclass() {
                schema_error!(%entry_type, %attr, "object classes can not be mapped to a field");
                return Err(DescriptorError::ReservedAttribute(attr.clone()));
            }

            if *field == identity {
                schema_error!(%entry_type, %field, "identity field is also mapped as an attribute");
                return Err(DescriptorError::IdentityMappedAsAttribute(field.clone()));
            }

            if !seen_fields.insert(field.as_str()) {
                schema_error!(%entry_type, %field, "field is mapped more than once");
                return Err(DescriptorError::DuplicateField(field.clone()));
            }

            if !seen_attrs.insert(attribute.clone()) {
                schema_error!(%entry_type, %attr, "attribute is mapped by more than one field");
                return Err(DescriptorError::DuplicateAttribute(attr.clone()));
            }

            fields.push(FieldDescriptor {
                field: field.clone(),
                attribute,
                cardinality: *cardinality,
            });
        }

        schema_info!(
            %entry_type,
            object_classes = ?self.object_classes,
            attributes = fields.len(),
            "entry descriptor built"
        );

        Ok(EntryDescriptor {
            entry_type,
            object_classes: self.object_classes,
            identity,
            fields,
        })
    }
}

fn check_object_classes(entry_type: &str, ocs: &[String]) -> Result<(), DescriptorError> {
    if ocs.is_empty() {
        schema_error!(%entry_type, "entry type declares no object classes");
        return Err(DescriptorError::NoObjectClass);
    }
    let mut seen = BTreeSet::new();
    for oc in ocs {
        if !seen.insert(oc.to_lowercase()) {
            schema_error!(%entry_type, %oc, "object class declared more than once");
            return Err(DescriptorError::DuplicateObjectClass(oc.clone()));
        }
    }
    Ok(())
}
