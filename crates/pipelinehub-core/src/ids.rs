//! Record identity and foreign-key references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned numeric identity of a record.
///
/// `RecordId::default()` (zero) marks a record that has not been created yet;
/// the backend never assigns zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a record ID from its raw value.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipelinehub_core::RecordId;
    ///
    /// let id = RecordId::new(17);
    /// assert_eq!(id.get(), 17);
    /// assert!(id.is_assigned());
    /// ```
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns `true` once the backend has assigned this identity.
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A foreign-key reference to another record.
///
/// The backend returns lookups either as a bare id or as an `{Id, Name}`
/// object; only the id is ever written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LookupRepr")]
pub struct Lookup {
    /// Referenced record
    pub id: RecordId,
    /// Display name of the referenced record, when the backend expanded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Lookup {
    /// A reference carrying only the id.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// A reference carrying the id and the referenced record's name.
    pub fn named(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// The display name, or an empty string.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LookupRepr {
    Bare(RecordId),
    Full {
        id: RecordId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<LookupRepr> for Lookup {
    fn from(repr: LookupRepr) -> Self {
        match repr {
            LookupRepr::Bare(id) => Lookup { id, name: None },
            LookupRepr::Full { id, name } => Lookup { id, name },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::new(42).to_string(), "42");
    }

    #[test]
    fn test_record_id_from_str_trims() {
        let id: RecordId = " 12 ".parse().unwrap();
        assert_eq!(id, RecordId::new(12));
        assert!("twelve".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_id_default_is_unassigned() {
        assert!(!RecordId::default().is_assigned());
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId::new(5)).unwrap();
        assert_eq!(json, "5");
    }

    #[test]
    fn test_lookup_accepts_bare_id() {
        let lookup: Lookup = serde_json::from_str("9").unwrap();
        assert_eq!(lookup, Lookup::new(9));
    }

    #[test]
    fn test_lookup_accepts_object() {
        let lookup: Lookup = serde_json::from_str(r#"{"id":3,"name":"Acme"}"#).unwrap();
        assert_eq!(lookup, Lookup::named(3, "Acme"));
        assert_eq!(lookup.name_or_empty(), "Acme");
    }

    #[test]
    fn test_lookup_serializes_without_missing_name() {
        let json = serde_json::to_string(&Lookup::new(4)).unwrap();
        assert_eq!(json, r#"{"id":4}"#);
    }
}
