//! Wire-shaped and response-shaped directory entry types.

use serde::Serialize;
use std::collections::HashMap;

/// Directory result code for a successful operation.
pub const RC_SUCCESS: u32 = 0;
/// Directory result code for `noSuchObject`.
pub const RC_NO_SUCH_OBJECT: u32 = 32;

/// Single attribute as delivered by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Attribute type name.
    pub name: String,
    /// Attribute values, in server delivery order.
    pub values: Vec<String>,
}

/// Entry as delivered by the directory, prior to flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute sequence, in server delivery order.
    pub attributes: Vec<RawAttribute>,
}

/// JSON-ready entry with attributes collapsed into a map.
///
/// Every attribute name present in the raw entry appears exactly once; for a
/// duplicate name the last write wins. Value order within an attribute is
/// preserved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FlattenedEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute-name to value-list mapping.
    pub attributes: HashMap<String, Vec<String>>,
}

impl From<RawEntry> for FlattenedEntry {
    fn from(raw: RawEntry) -> Self {
        let mut attributes = HashMap::with_capacity(raw.attributes.len());
        for attribute in raw.attributes {
            attributes.insert(attribute.name, attribute.values);
        }
        Self {
            dn: raw.dn,
            attributes,
        }
    }
}

/// Events emitted by one directory search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// One matching entry was delivered.
    Entry(RawEntry),
    /// The server redirected to other servers; never followed.
    Referral(Vec<String>),
    /// The search finished with the given result code.
    End {
        /// Numeric result code carried by the end event; `0` is success.
        status: u32,
    },
    /// The search failed before finishing.
    Fault(SearchFault),
}

/// Error signal carried by a [`SearchEvent::Fault`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFault {
    /// The search base does not exist.
    NoSuchObject,
    /// Any other directory- or transport-level failure.
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::{FlattenedEntry, RawAttribute, RawEntry};

    #[test]
    fn flattening_preserves_multi_valued_order() {
        let raw = RawEntry {
            dn: "uid=emmy,ou=people,dc=example,dc=com".into(),
            attributes: vec![RawAttribute {
                name: "mail".into(),
                values: vec!["a@x".into(), "b@x".into()],
            }],
        };
        let flat = FlattenedEntry::from(raw);
        assert_eq!(
            flat.attributes["mail"],
            vec!["a@x".to_string(), "b@x".to_string()]
        );
    }

    #[test]
    fn duplicate_attribute_names_keep_last_write() {
        let raw = RawEntry {
            dn: "cn=dup".into(),
            attributes: vec![
                RawAttribute {
                    name: "cn".into(),
                    values: vec!["first".into()],
                },
                RawAttribute {
                    name: "cn".into(),
                    values: vec!["second".into()],
                },
            ],
        };
        let flat = FlattenedEntry::from(raw);
        assert_eq!(flat.attributes.len(), 1);
        assert_eq!(flat.attributes["cn"], vec!["second".to_string()]);
    }
}
