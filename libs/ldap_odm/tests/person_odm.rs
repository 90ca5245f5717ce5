use std::collections::BTreeSet;

use ldap3_proto::proto::{LdapPartialAttribute, LdapSearchResultEntry};
use ldap_odm::config::{MapperConfig, ObjectClassPolicy};
use ldap_odm::directory::MemoryDirectory;
use ldap_odm::mapper::EntryMapper;
use ldap_odm::person::Person;
use ldap_odm::prelude::*;
use ldap_odm::template::OdmTemplate;

const BASE_DN: &str = "ou=people,dc=example,dc=com";

fn pa(atype: &str, vals: &[&str]) -> LdapPartialAttribute {
    LdapPartialAttribute {
        atype: atype.to_string(),
        vals: vals.iter().map(|v| v.as_bytes().to_vec()).collect(),
    }
}

fn setup(config: MapperConfig) -> OdmTemplate<MemoryDirectory> {
    sketching::test_init();
    let mapper = EntryMapper::new(config)
        .with_entry::<Person>()
        .and_then(|m| m.with_entry::<Group>())
        .expect("failed to register entry types");
    OdmTemplate::new(mapper, MemoryDirectory::new())
}

fn person(cn: &str) -> Person {
    let base: Dn = BASE_DN.parse().expect("invalid base dn");
    let mut p = Person::new();
    p.set_dn(base.child("cn", cn).expect("invalid child dn"));
    p.set_common_name(Some(cn.to_string()));
    p
}

/// A second entry type, so that searches return entries of mixed classes.
#[derive(Debug, Default, Clone, PartialEq)]
struct Group {
    dn: Option<Dn>,
    name: Option<String>,
    members: Vec<String>,
}

impl DirectoryEntry for Group {
    const ENTRY_TYPE: &'static str = "group";

    fn describe() -> Result<EntryDescriptor, OdmError> {
        EntryDescriptor::builder(Self::ENTRY_TYPE)
            .object_classes(&["groupOfNames", "top"])
            .identity("dn")
            .single("name", "cn")
            .multi("members", "member")
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
        match field {
            "name" => Some(FieldValue::Single(self.name.clone())),
            "members" => Some(FieldValue::Multi(self.members.clone())),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), OdmError> {
        match (field, value) {
            ("name", FieldValue::Single(v)) => self.name = v,
            ("members", FieldValue::Multi(vs)) => self.members = vs,
            (f, _) => return Err(OdmError::UnknownField(f.to_string())),
        }
        Ok(())
    }
}

/// A type that declares its identity twice.
#[derive(Debug, Default)]
struct TwoIdentities {
    dn: Option<Dn>,
}

impl DirectoryEntry for TwoIdentities {
    const ENTRY_TYPE: &'static str = "two_identities";

    fn describe() -> Result<EntryDescriptor, OdmError> {
        EntryDescriptor::builder(Self::ENTRY_TYPE)
            .object_class("top")
            .identity("dn")
            .identity("alt_dn")
            .build()
            .map_err(OdmError::from)
    }

    fn dn(&self) -> Option<&Dn> {
        self.dn.as_ref()
    }

    fn set_dn(&mut self, dn: Dn) {
        self.dn = Some(dn);
    }

    fn get(&self, _field: &str) -> Option<FieldValue> {
        None
    }

    fn set(&mut self, field: &str, _value: FieldValue) -> Result<(), OdmError> {
        Err(OdmError::UnknownField(field.to_string()))
    }
}

#[test]
fn test_person_jane_doe_from_directory() {
    let mut odm = setup(MapperConfig::default());
    let dn: Dn = format!("cn=Jane Doe,{}", BASE_DN)
        .parse()
        .expect("invalid dn");
    odm.directory_mut()
        .insert_raw(&LdapSearchResultEntry {
            dn: dn.to_string(),
            attributes: vec![
                pa(
                    "objectClass",
                    &["inetOrgPerson", "organizationalPerson", "person", "top"],
                ),
                pa("cn", &["Jane Doe"]),
                pa("sn", &["Doe"]),
                pa("uid", &["jdoe", "jdoe2"]),
                pa("mail", &["jane@example.com"]),
            ],
        })
        .expect("failed to load entry");

    let p: Person = odm
        .find_by_dn(&dn)
        .expect("search failed")
        .expect("jane is missing");

    assert_eq!(p.dn(), Some(&dn));
    assert_eq!(p.common_name(), Some("Jane Doe"));
    assert_eq!(p.surname(), Some("Doe"));
    let uids: BTreeSet<_> = p.user_id().iter().map(String::as_str).collect();
    assert_eq!(uids, BTreeSet::from(["jdoe", "jdoe2"]));
    assert!(p.desc().is_empty());
    assert_eq!(p.telephone_number(), None);

    let missing: Dn = format!("cn=John Doe,{}", BASE_DN)
        .parse()
        .expect("invalid dn");
    assert_eq!(odm.find_by_dn::<Person>(&missing), Ok(None));
}

#[test]
fn test_person_write_without_dn_never_contacts_directory() {
    let mut odm = setup(MapperConfig::default());
    let mut p = Person::new();
    p.set_common_name(Some("Nobody".to_string()));

    let expect = Err(OdmError::MissingIdentity("person".to_string()));
    assert_eq!(odm.create(&p), expect);
    assert_eq!(odm.update(&p), expect);
    assert_eq!(odm.delete(&p), expect);

    assert_eq!(odm.directory().operation_count(), 0);
    assert!(odm.directory().is_empty());
}

#[test]
fn test_person_round_trip_through_directory() {
    let mut odm = setup(MapperConfig::default());
    let mut p = person("Jane Doe");
    p.set_surname(Some("Doe".to_string()));
    // The directory holds values as a set, so these come back in its order, not ours.
    p.set_user_id(vec!["b".to_string(), "a".to_string()]);
    p.set_desc(vec!["engineer".to_string()]);

    odm.create(&p).expect("create failed");

    let dn = p.dn().cloned().expect("person has a dn");
    let back: Person = odm
        .find_by_dn(&dn)
        .expect("search failed")
        .expect("person is missing");

    let uids: BTreeSet<_> = back.user_id().iter().cloned().collect();
    assert_eq!(uids, BTreeSet::from(["a".to_string(), "b".to_string()]));
    assert_eq!(back.common_name(), p.common_name());
    assert_eq!(back.surname(), p.surname());
    assert_eq!(back.desc(), p.desc());
    assert_eq!(back.telephone_number(), None);
    assert_eq!(back.dn(), p.dn());

    assert_eq!(
        odm.create(&p),
        Err(OdmError::EntryAlreadyExists(dn.to_string()))
    );
}

#[test]
fn test_person_update_replaces_and_removes() {
    let mut odm = setup(MapperConfig::default());
    let mut p = person("Jane Doe");
    p.set_surname(Some("Doe".to_string()));
    p.set_telephone_number(Some("+1 555 0100".to_string()));
    p.set_user_id(vec!["jdoe".to_string(), "jdoe2".to_string()]);
    odm.create(&p).expect("create failed");

    p.set_telephone_number(None);
    p.set_user_id(vec!["jane".to_string()]);
    odm.update(&p).expect("update failed");

    let dn = p.dn().cloned().expect("person has a dn");
    let back: Person = odm
        .find_by_dn(&dn)
        .expect("search failed")
        .expect("person is missing");
    assert_eq!(back.telephone_number(), None);
    assert_eq!(back.user_id(), &["jane".to_string()]);
    assert_eq!(back.surname(), Some("Doe"));

    // Updating an entry that was never created fails in the directory.
    let ghost = person("Ghost");
    assert!(matches!(odm.update(&ghost), Err(OdmError::NoSuchEntry(_))));

    odm.delete(&p).expect("delete failed");
    assert_eq!(odm.find_by_dn::<Person>(&dn), Ok(None));
}

#[test]
fn test_person_find_all_object_class_policy() {
    let mut odm = setup(MapperConfig::default());
    odm.create(&person("Alice")).expect("create failed");
    odm.create(&person("Bob")).expect("create failed");
    let group = Group {
        dn: Some(
            format!("cn=admins,{}", BASE_DN)
                .parse()
                .expect("invalid dn"),
        ),
        name: Some("admins".to_string()),
        members: vec![format!("cn=Alice,{}", BASE_DN)],
    };
    odm.create(&group).expect("create failed");

    let base: Dn = BASE_DN.parse().expect("invalid base dn");

    // By default, a group under the people subtree is an error when reading people.
    assert!(matches!(
        odm.find_all::<Person>(&base),
        Err(OdmError::ObjectClassMismatch { .. })
    ));

    let config = MapperConfig {
        object_class_policy: ObjectClassPolicy::Filter,
        ..Default::default()
    };
    let mut filtering = OdmTemplate::new(
        EntryMapper::new(config)
            .with_entry::<Person>()
            .and_then(|m| m.with_entry::<Group>())
            .expect("failed to register entry types"),
        odm.into_directory(),
    );

    let people: Vec<Person> = filtering.find_all(&base).expect("search failed");
    let names: BTreeSet<_> = people
        .iter()
        .filter_map(|p| p.common_name())
        .collect();
    assert_eq!(names, BTreeSet::from(["Alice", "Bob"]));

    let groups: Vec<Group> = filtering.find_all(&base).expect("search failed");
    assert_eq!(groups, vec![group.clone()]);

    filtering.delete(&group).expect("delete failed");
    assert!(filtering
        .find_all::<Group>(&base)
        .expect("search failed")
        .is_empty());
}

#[test]
fn test_two_identities_rejected_at_setup() {
    sketching::test_init();
    let mut mapper = EntryMapper::default();
    assert_eq!(
        mapper.register::<TwoIdentities>(),
        Err(OdmError::InvalidDescriptor(DescriptorError::MultipleIdentity(
            vec!["dn".to_string(), "alt_dn".to_string()]
        )))
    );

    // The type was never registered, so it can not be used either.
    let odm = OdmTemplate::new(mapper, MemoryDirectory::new());
    let dn: Dn = "cn=x,dc=example".parse().expect("invalid dn");
    assert_eq!(
        odm.find_by_dn::<TwoIdentities>(&dn).map(|_| ()),
        Err(OdmError::UnregisteredType("two_identities".to_string()))
    );
    assert_eq!(odm.directory().operation_count(), 0);
}

#[test]
fn test_person_single_valued_attribute_with_many_values() {
    let mut odm = setup(MapperConfig::default());
    let dn: Dn = format!("cn=Twice,{}", BASE_DN).parse().expect("invalid dn");
    odm.directory_mut()
        .insert_raw(&LdapSearchResultEntry {
            dn: dn.to_string(),
            attributes: vec![
                pa(
                    "objectClass",
                    &["inetOrgPerson", "organizationalPerson", "person", "top"],
                ),
                pa("cn", &["Twice"]),
                pa("telephoneNumber", &["+1 555 0100", "+1 555 0101"]),
            ],
        })
        .expect("failed to load entry");

    assert_eq!(
        odm.find_by_dn::<Person>(&dn),
        Err(OdmError::CardinalityMismatch {
            attribute: "telephoneNumber".to_string(),
            found: 2
        })
    );
}
