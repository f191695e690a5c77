// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Concept keys and lazy references.
//!
//! A key is derived from the concept's family and the ordered values of its
//! key fields:
//!
//! ```text
//! DataStructure Demo.Invoice
//! Property Demo.Invoice.Code
//! Property Demo.Invoice.'Due date'
//! ```
//!
//! Reference key fields contribute the key *values* of the referenced concept
//! (everything after the family), so keys compose recursively without ever
//! holding the referenced object.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized unique identity of a concept.
///
/// Two concepts with equal keys are the same concept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptKey(String);

impl ConceptKey {
    /// Build a key from a family name and already escaped key fragments.
    #[must_use]
    pub fn from_parts(family: &str, fragments: &[String]) -> Self {
        Self(format!("{} {}", family, fragments.join(".")))
    }

    /// Wrap an existing key string verbatim.
    ///
    /// Used when keys come back from persisted artifacts or from the parser.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Family part of the key (e.g. `DataStructure`).
    #[must_use]
    pub fn family(&self) -> &str {
        self.0.split_once(' ').map_or(self.0.as_str(), |(family, _)| family)
    }

    /// Key values part of the key (e.g. `Demo.Invoice`).
    #[must_use]
    pub fn values(&self) -> &str {
        self.0.split_once(' ').map_or("", |(_, values)| values)
    }

    /// The whole key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lazy reference to another concept, stored by key.
///
/// The target may not exist yet: macros routinely reference concepts that a
/// later expansion pass materializes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptRef(ConceptKey);

impl ConceptRef {
    /// Reference the concept with the given key.
    #[must_use]
    pub fn new(key: ConceptKey) -> Self {
        Self(key)
    }

    /// Reference a concept by family and raw (unescaped) key values.
    ///
    /// ```rust
    /// use concept_forge::ConceptRef;
    ///
    /// let invoice = ConceptRef::from_values("DataStructure", ["Demo", "Invoice"]);
    /// assert_eq!(invoice.key().as_str(), "DataStructure Demo.Invoice");
    /// ```
    #[must_use]
    pub fn from_values<I, S>(family: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let fragments: Vec<String> = values
            .into_iter()
            .map(|v| escape_fragment(v.as_ref()))
            .collect();
        Self(ConceptKey::from_parts(family, &fragments))
    }

    /// Key of the referenced concept.
    #[must_use]
    pub fn key(&self) -> &ConceptKey {
        &self.0
    }
}

impl From<ConceptKey> for ConceptRef {
    fn from(key: ConceptKey) -> Self {
        Self(key)
    }
}

impl fmt::Display for ConceptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Value usable as a key field.
///
/// Implemented for primitives and for [`ConceptRef`]; the derive macro calls
/// it for every `#[concept(key)]` field.
pub trait KeyFragment {
    /// Escaped fragment contributed to the owning concept's key.
    fn key_fragment(&self) -> String;
}

impl KeyFragment for String {
    fn key_fragment(&self) -> String {
        escape_fragment(self)
    }
}

impl KeyFragment for &str {
    fn key_fragment(&self) -> String {
        escape_fragment(self)
    }
}

impl KeyFragment for bool {
    fn key_fragment(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_fragment {
    ($($ty:ty),*) => {
        $(
            impl KeyFragment for $ty {
                fn key_fragment(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_fragment!(i32, i64, u32, u64, usize);

/// A reference contributes the referenced key's values without its family.
///
/// References to different families with equal values therefore yield equal
/// fragments; kinds whose key fields may point into several families must
/// keep a distinguishing field of their own.
impl KeyFragment for ConceptRef {
    fn key_fragment(&self) -> String {
        self.0.values().to_string()
    }
}

/// Escape a raw value for use inside a key.
///
/// Plain identifiers are kept verbatim; everything else is single-quoted with
/// embedded quotes doubled.
#[must_use]
pub fn escape_fragment(value: &str) -> String {
    let plain =
        !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Reverse of [`escape_fragment`] for a single fragment.
///
/// ```rust
/// use concept_forge::unescape_fragment;
///
/// assert_eq!(unescape_fragment("'it''s'"), "it's");
/// assert_eq!(unescape_fragment("Invoice"), "Invoice");
/// ```
#[must_use]
pub fn unescape_fragment(fragment: &str) -> String {
    match fragment
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => fragment.to_string()
    }
}
