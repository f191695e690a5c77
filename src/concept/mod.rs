// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Concept model: typed, keyed nodes of the declarative model graph.
//!
//! A concept kind is a plain struct deriving [`Concept`](macro@crate::Concept).
//! The compiler never needs a class hierarchy over kinds; it only asks a
//! handful of capability questions through the accessors on [`Concept`]:
//!
//! | Accessor | Capability |
//! |----------|------------|
//! | [`Concept::as_macro`] | emits new concepts |
//! | [`Concept::as_validated`] | checks itself against the closed model |
//! | [`Concept::as_initializer`] | computes derived fields before use |
//! | [`Concept::as_error`] | deferred authoring error placeholder |
//! | [`Concept::as_dependency`] | declares an explicit ordering edge |
//! | [`Concept::as_sql_object`] | produces a database-visible object |
//!
//! # Example
//!
//! ```rust
//! use concept_forge::{Concept, ConceptRef};
//!
//! #[derive(Debug, Clone, Concept)]
//! #[concept(keyword = "Entity", family = "DataStructure")]
//! pub struct TableInfo {
//!     #[concept(key)]
//!     pub module: ConceptRef,
//!
//!     #[concept(key)]
//!     pub name: String
//! }
//!
//! let table = TableInfo {
//!     module: ConceptRef::from_values("Module", ["Demo"]),
//!     name:   "Invoice".to_string()
//! };
//! assert_eq!(table.key().as_str(), "DataStructure Demo.Invoice");
//! assert_eq!(table.description(), "Entity Demo.Invoice");
//! ```

mod capability;
mod key;

use std::{any::Any, fmt};

pub use capability::{
    AlternativeInitialization, DependencyConcept, ErrorConcept, Initialization, MacroConcept,
    SqlObjectConcept, ValidatedConcept
};
pub use key::{ConceptKey, ConceptRef, KeyFragment, escape_fragment, unescape_fragment};

/// A typed, keyed node of the model.
///
/// Implemented by `#[derive(Concept)]`; hand-written implementations are
/// possible but must keep [`key_values`](Concept::key_values) stable, since
/// structural identity is derived from it.
pub trait Concept: Any + fmt::Debug + Send + Sync {
    /// Keyword used in human-readable descriptions (e.g. `Entity`).
    fn keyword(&self) -> &'static str;

    /// Key family (e.g. `DataStructure`); kinds sharing a family share a key
    /// space.
    fn family(&self) -> &'static str;

    /// Escaped key fragments in key field order.
    fn key_values(&self) -> Vec<String>;

    /// All reference fields, key and non-key.
    fn references(&self) -> Vec<FieldReference<'_>>;

    /// Upcast for downcasting to the concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Clone behind a box.
    fn clone_concept(&self) -> Box<dyn Concept>;

    /// Unique key of this concept.
    fn key(&self) -> ConceptKey {
        ConceptKey::from_parts(self.family(), &self.key_values())
    }

    /// Human-readable description used in error messages.
    fn description(&self) -> String {
        format!("{} {}", self.keyword(), self.key_values().join("."))
    }

    fn as_macro(&self) -> Option<&dyn MacroConcept> {
        None
    }

    fn as_validated(&self) -> Option<&dyn ValidatedConcept> {
        None
    }

    /// Whether [`as_initializer`](Concept::as_initializer) returns `Some`.
    fn is_initializer(&self) -> bool {
        false
    }

    fn as_initializer(&mut self) -> Option<&mut dyn AlternativeInitialization> {
        None
    }

    fn as_error(&self) -> Option<&dyn ErrorConcept> {
        None
    }

    fn as_dependency(&self) -> Option<&dyn DependencyConcept> {
        None
    }

    fn as_sql_object(&self) -> Option<&dyn SqlObjectConcept> {
        None
    }
}

impl dyn Concept {
    /// Downcast to a concrete kind.
    pub fn downcast_ref<T: Concept>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether this concept is of kind `T`.
    pub fn is<T: Concept>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn Concept> {
    fn clone(&self) -> Self {
        self.clone_concept()
    }
}

/// Static companion of [`Concept`], available on concrete kinds.
pub trait ConceptKind: Concept + Sized {
    /// Keyword used in descriptions.
    const KEYWORD: &'static str;

    /// Key family.
    const FAMILY: &'static str;

    /// Key field names in key order (PascalCase).
    const KEY_FIELDS: &'static [&'static str];
}

/// One reference held by a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReference<'a> {
    /// Rust name of the holding field.
    pub field: &'static str,

    /// Referenced concept.
    pub target: &'a ConceptRef,

    /// Whether the holding field is part of the key.
    pub is_key: bool
}

/// Field shapes that hold references.
///
/// Lets the derive macro treat `ConceptRef`, `Option<ConceptRef>` and
/// `Vec<ConceptRef>` uniformly.
pub trait ReferenceField {
    /// Push every reference held by this field.
    fn collect_references<'a>(
        &'a self,
        field: &'static str,
        is_key: bool,
        out: &mut Vec<FieldReference<'a>>
    );
}

impl ReferenceField for ConceptRef {
    fn collect_references<'a>(
        &'a self,
        field: &'static str,
        is_key: bool,
        out: &mut Vec<FieldReference<'a>>
    ) {
        out.push(FieldReference {
            field,
            target: self,
            is_key
        });
    }
}

impl ReferenceField for Option<ConceptRef> {
    fn collect_references<'a>(
        &'a self,
        field: &'static str,
        is_key: bool,
        out: &mut Vec<FieldReference<'a>>
    ) {
        if let Some(target) = self {
            target.collect_references(field, is_key, out);
        }
    }
}

impl ReferenceField for Vec<ConceptRef> {
    fn collect_references<'a>(
        &'a self,
        field: &'static str,
        is_key: bool,
        out: &mut Vec<FieldReference<'a>>
    ) {
        for target in self {
            target.collect_references(field, is_key, out);
        }
    }
}

/// Reference to a concrete concept value.
///
/// ```rust
/// use concept_forge::{ConceptRef, reference_to};
/// # use concept_forge::Concept;
/// # #[derive(Debug, Clone, Concept)]
/// # pub struct ModuleInfo { #[concept(key)] pub name: String }
///
/// let module = ModuleInfo { name: "Demo".into() };
/// assert_eq!(reference_to(&module), ConceptRef::from_values("Module", ["Demo"]));
/// ```
pub fn reference_to(concept: &dyn Concept) -> ConceptRef {
    ConceptRef::new(concept.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, crate::Concept)]
    struct ModuleInfo {
        #[concept(key)]
        name: String
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(keyword = "Entity", family = "DataStructure")]
    struct TableInfo {
        #[concept(key)]
        module: ConceptRef,
        #[concept(key)]
        name:   String,
        base:   Option<ConceptRef>,
        mixins: Vec<ConceptRef>
    }

    fn demo() -> TableInfo {
        TableInfo {
            module: ConceptRef::from_values("Module", ["Demo"]),
            name:   "Invoice".into(),
            base:   None,
            mixins: vec![
                ConceptRef::from_values("Mixin", ["A"]),
                ConceptRef::from_values("Mixin", ["B"]),
            ]
        }
    }

    #[test]
    fn key_uses_family_and_description_uses_keyword() {
        let table = demo();
        assert_eq!(table.key().as_str(), "DataStructure Demo.Invoice");
        assert_eq!(table.description(), "Entity Demo.Invoice");
    }

    #[test]
    fn kind_constants() {
        assert_eq!(TableInfo::KEYWORD, "Entity");
        assert_eq!(TableInfo::FAMILY, "DataStructure");
        assert_eq!(TableInfo::KEY_FIELDS, &["Module", "Name"]);
        assert_eq!(ModuleInfo::KEYWORD, "Module");
    }

    #[test]
    fn references_cover_all_shapes() {
        let table = demo();
        let refs = table.references();
        let fields: Vec<_> = refs.iter().map(|r| (r.field, r.is_key)).collect();
        assert_eq!(fields, vec![("module", true), ("mixins", false), ("mixins", false)]);
    }

    #[test]
    fn downcast_through_dyn() {
        let boxed: Box<dyn Concept> = Box::new(demo());
        assert!(boxed.is::<TableInfo>());
        assert!(!boxed.is::<ModuleInfo>());
        assert_eq!(boxed.downcast_ref::<TableInfo>().unwrap().name, "Invoice");
        let cloned = boxed.clone();
        assert_eq!(cloned.key(), boxed.key());
    }

    #[test]
    fn capabilities_default_to_none() {
        let mut module = ModuleInfo { name: "Demo".into() };
        assert!(module.as_macro().is_none());
        assert!(module.as_validated().is_none());
        assert!(!module.is_initializer());
        assert!(module.as_initializer().is_none());
        assert!(module.as_sql_object().is_none());
    }
}
