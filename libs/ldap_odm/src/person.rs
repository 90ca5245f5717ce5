//! A person entry, as held by most directories under the `inetOrgPerson` object class.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const PERSON_OBJECT_CLASSES: [&str; 4] =
    ["inetOrgPerson", "organizationalPerson", "person", "top"];

// field, attribute, cardinality
const PERSON_ATTRIBUTES: [(&str, &str, Cardinality); 5] = [
    ("common_name", "cn", Cardinality::Single),
    ("surname", "sn", Cardinality::Single),
    ("desc", "description", Cardinality::Multi),
    ("user_id", "uid", Cardinality::Multi),
    ("telephone_number", "telephoneNumber", Cardinality::Single),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    dn: Option<Dn>,
    common_name: Option<String>,
    surname: Option<String>,
    desc: Vec<String>,
    user_id: Vec<String>,
    telephone_number: Option<String>,
}

impl Person {
    pub fn new() -> Self {
        Person::default()
    }

    pub fn dn(&self) -> Option<&Dn> {
        self.dn.as_ref()
    }

    /// Forget the distinguished name. It is set through [`DirectoryEntry::set_dn`].
    pub fn clear_dn(&mut self) {
        self.dn = None;
    }

    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    pub fn set_common_name(&mut self, common_name: Option<String>) {
        self.common_name = common_name;
    }

    pub fn surname(&self) -> Option<&str> {
        self.surname.as_deref()
    }

    pub fn set_surname(&mut self, surname: Option<String>) {
        self.surname = surname;
    }

    pub fn desc(&self) -> &[String] {
        &self.desc
    }

    pub fn set_desc(&mut self, desc: Vec<String>) {
        self.desc = desc;
    }

    pub fn user_id(&self) -> &[String] {
        &self.user_id
    }

    pub fn set_user_id(&mut self, user_id: Vec<String>) {
        self.user_id = user_id;
    }

    pub fn telephone_number(&self) -> Option<&str> {
        self.telephone_number.as_deref()
    }

    pub fn set_telephone_number(&mut self, telephone_number: Option<String>) {
        self.telephone_number = telephone_number;
    }
}

impl DirectoryEntry for Person {
    const ENTRY_TYPE: &'static str = "person";

    fn describe() -> Result<EntryDescriptor, OdmError> {
        let builder = EntryDescriptor::builder(Self::ENTRY_TYPE)
            .object_classes(&PERSON_OBJECT_CLASSES)
            .identity("dn");

        PERSON_ATTRIBUTES
            .iter()
            .fold(builder, |b, (field, attr, card)| match card {
                Cardinality::Single => b.single(field, attr),
                Cardinality::Multi => b.multi(field, attr),
            })
            .build()
            .map_err(OdmError::from)
    }

    fn dn(&self) -> Option<&Dn> {
        self.dn.as_ref()
    }

    fn set_dn(&mut self, dn: Dn) {
        self.dn = Some(dn);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        let v = match field {
            "common_name" => FieldValue::Single(self.common_name.clone()),
            "surname" => FieldValue::Single(self.surname.clone()),
            "desc" => FieldValue::Multi(self.desc.clone()),
            "user_id" => FieldValue::Multi(self.user_id.clone()),
            "telephone_number" => FieldValue::Single(self.telephone_number.clone()),
            _ => return None,
        };
        Some(v)
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), OdmError> {
        match (field, value) {
            ("common_name", FieldValue::Single(v)) => self.common_name = v,
            ("surname", FieldValue::Single(v)) => self.surname = v,
            ("desc", FieldValue::Multi(vs)) => self.desc = vs,
            ("user_id", FieldValue::Multi(vs)) => self.user_id = vs,
            ("telephone_number", FieldValue::Single(v)) => self.telephone_number = v,
            (field, value) => {
                return match PERSON_ATTRIBUTES.iter().find(|(f, _, _)| *f == field) {
                    Some((_, attr, _)) => Err(OdmError::CardinalityMismatch {
                        attribute: attr.to_string(),
                        found: value.values().len(),
                    }),
                    None => Err(OdmError::UnknownField(field.to_string())),
                }
            }
        }
        Ok(())
    }
}
