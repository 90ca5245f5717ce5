//! Distinguished names.
//!
//! A [`Dn`] is an ordered list of [`Rdn`]s, most specific first, as written in the RFC 4514
//! string form: `cn=Jane Doe,ou=people,dc=example,dc=com`. Each rdn holds one or more
//! attribute value assertions joined by `+`.
//!
//! Comparison is case-insensitive on both attribute types and values, and multi-valued rdns
//! compare as sets, so `CN=Jane Doe+UID=jdoe` is the same rdn as `uid=jdoe+cn=jane doe`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::AttrName;
use crate::error::OdmError;

#[derive(Clone, Debug)]
pub struct Ava {
    attr: AttrName,
    value: String,
}

impl Ava {
    pub fn attr(&self) -> &AttrName {
        &self.attr
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn normalised(&self) -> (String, String) {
        (self.attr.key().to_string(), self.value.to_lowercase())
    }
}

#[derive(Clone, Debug)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    pub fn new(attr: &str, value: &str) -> Result<Self, OdmError> {
        let attr = AttrName::new(attr).map_err(|_| OdmError::InvalidDn(attr.to_string()))?;
        // An empty value has no string form that parses back.
        if value.is_empty() {
            debug!(%attr, "refusing rdn with an empty value");
            return Err(OdmError::InvalidDn(format!("{}=", attr)));
        }
        Ok(Rdn {
            avas: vec![Ava {
                attr,
                value: value.to_string(),
            }],
        })
    }

    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// The value asserted for `attr` in this rdn, if any.
    pub fn value_of(&self, attr: &str) -> Option<&str> {
        self.avas
            .iter()
            .find(|ava| ava.attr.matches(attr))
            .map(|ava| ava.value.as_str())
    }

    fn normalised(&self) -> Vec<(String, String)> {
        let mut n: Vec<_> = self.avas.iter().map(Ava::normalised).collect();
        n.sort_unstable();
        n
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.normalised() == other.normalised()
    }
}

impl Eq for Rdn {}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}={}", ava.attr, escape_value(&ava.value))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty dn, naming the root of the directory.
    pub fn root() -> Self {
        Dn { rdns: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The most specific rdn.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            None
        } else {
            Some(Dn {
                rdns: self.rdns[1..].to_vec(),
            })
        }
    }

    /// Build the dn of a child entry directly below this one.
    pub fn child(&self, attr: &str, value: &str) -> Result<Dn, OdmError> {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(Rdn::new(attr, value)?);
        rdns.extend(self.rdns.iter().cloned());
        Ok(Dn { rdns })
    }

    /// True if `self` is strictly below `ancestor` in the tree. Every dn is a descendant of the
    /// root, except the root itself.
    pub fn is_descendant_of(&self, ancestor: &Dn) -> bool {
        self.rdns.len() > ancestor.rdns.len()
            && self.rdns[self.rdns.len() - ancestor.rdns.len()..] == ancestor.rdns[..]
    }

    /// A lowercased canonical form, suitable as a lookup key.
    pub fn normalised(&self) -> String {
        self.rdns
            .iter()
            .map(|rdn| {
                rdn.normalised()
                    .into_iter()
                    .map(|(a, v)| format!("{}={}", a, escape_value(&v)))
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalised().hash(state)
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", rdn)?;
        }
        Ok(())
    }
}

impl FromStr for Dn {
    type Err = OdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dn(s)
    }
}

impl TryFrom<String> for Dn {
    type Error = OdmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_dn(&value)
    }
}

impl TryFrom<&str> for Dn {
    type Error = OdmError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_dn(value)
    }
}

impl From<Dn> for String {
    fn from(value: Dn) -> Self {
        value.to_string()
    }
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            '"' | '+' | ',' | ';' | '<' | '>' | '\\' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

fn invalid(input: &str, reason: &str) -> OdmError {
    debug!(?input, %reason, "rejecting distinguished name");
    OdmError::InvalidDn(input.to_string())
}

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn parse_dn(input: &str) -> Result<Dn, OdmError> {
    let bytes = input.as_bytes();
    let mut rdns = Vec::new();
    let mut avas = Vec::new();
    let mut pos = 0;

    if input.trim().is_empty() {
        return Ok(Dn::root());
    }

    loop {
        // attribute type, up to the '='
        let type_start = pos;
        while pos < bytes.len() && bytes[pos] != b'=' {
            if matches!(bytes[pos], b',' | b'+' | b';' | b'\\') {
                return Err(invalid(input, "separator in attribute type"));
            }
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err(invalid(input, "missing '='"));
        }
        let atype = input[type_start..pos].trim();
        let attr = AttrName::new(atype).map_err(|_| invalid(input, "bad attribute type"))?;
        pos += 1;

        // skip leading unescaped spaces of the value
        while pos < bytes.len() && bytes[pos] == b' ' {
            pos += 1;
        }

        // value, up to an unescaped separator
        let mut value: Vec<u8> = Vec::new();
        // Anything up to this length came from an escape and must not be trimmed.
        let mut protected = 0;
        let mut separator = None;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => {
                    let next = *bytes
                        .get(pos + 1)
                        .ok_or_else(|| invalid(input, "dangling escape"))?;
                    match (hex_nibble(next), bytes.get(pos + 2).copied().and_then(hex_nibble)) {
                        (Some(hi), Some(lo)) => {
                            value.push((hi << 4) | lo);
                            pos += 3;
                        }
                        _ => {
                            if !matches!(
                                next,
                                b' ' | b'"' | b'#' | b'+' | b',' | b';' | b'<' | b'=' | b'>'
                                    | b'\\'
                            ) {
                                return Err(invalid(input, "invalid escape"));
                            }
                            value.push(next);
                            pos += 2;
                        }
                    }
                    protected = value.len();
                }
                b @ (b',' | b'+' | b';') => {
                    separator = Some(b);
                    pos += 1;
                    break;
                }
                b => {
                    value.push(b);
                    pos += 1;
                }
            }
        }

        while value.len() > protected && value.last() == Some(&b' ') {
            value.pop();
        }
        let value = String::from_utf8(value).map_err(|_| invalid(input, "value is not utf-8"))?;
        if value.is_empty() {
            return Err(invalid(input, "empty attribute value"));
        }

        avas.push(Ava { attr, value });

        match separator {
            Some(b'+') => {}
            Some(_) => {
                rdns.push(Rdn {
                    avas: std::mem::take(&mut avas),
                });
                while pos < bytes.len() && bytes[pos] == b' ' {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(invalid(input, "trailing separator"));
                }
            }
            None => {
                rdns.push(Rdn {
                    avas: std::mem::take(&mut avas),
                });
                break;
            }
        }
    }

    Ok(Dn { rdns })
}
