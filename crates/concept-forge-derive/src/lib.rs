// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Derive macro for declaring concept kinds.
//!
//! This crate is an implementation detail of `concept-forge`; depend on that
//! crate and use its re-exported [`Concept`](macro@Concept) derive instead.
//!
//! # Attribute Quick Reference
//!
//! ## Kind-Level `#[concept(...)]`
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, Concept)]
//! #[concept(
//!     keyword = "Entity",       // Optional: defaults to the struct name without `Info`
//!     family = "DataStructure", // Optional: key family shared between kinds (default: keyword)
//!     expand,                   // Implements MacroConcept
//!     validate,                 // Implements ValidatedConcept
//!     initialize,               // Implements AlternativeInitialization
//!     error,                    // Implements ErrorConcept
//!     dependency,               // Implements DependencyConcept
//!     sql_object                // Implements SqlObjectConcept
//! )]
//! pub struct EntityInfo { /* ... */ }
//! ```
//!
//! ## Field-Level Attributes
//!
//! ```rust,ignore
//! pub struct PropertyInfo {
//!     #[concept(key)]                 // Part of the key, in declaration order
//!     pub data_structure: ConceptRef, // ConceptRef fields are references
//!
//!     #[concept(key)]
//!     pub name: String,
//!
//!     pub referenced: Option<ConceptRef> // Non-key reference, still an ordering edge
//! }
//! ```
//!
//! # Generated Code Overview
//!
//! | Generated Item | Description |
//! |----------------|-------------|
//! | `impl ConceptKind` | `KEYWORD`, `FAMILY`, `KEY_FIELDS` constants |
//! | `impl Concept` | key values, reference listing, downcasting, cloning |
//! | capability accessors | `as_macro`, `as_validated`, ... returning `Some(self)` |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

mod concept;

use proc_macro::TokenStream;

/// Derive macro turning a named struct into a concept kind.
///
/// # Overview
///
/// Every concept kind needs the same boilerplate: the keyword used in
/// descriptions, the key family, the ordered key field values, the list of
/// reference fields that become ordering edges, and the capability accessors
/// the compiler uses for duck-typed dispatch. This macro generates all of it.
///
/// # Field Rules
///
/// - At least one field must carry `#[concept(key)]`.
/// - Key fields must implement `KeyFragment` (strings, integers, `bool`,
///   `ConceptRef`).
/// - Any field typed `ConceptRef`, `Option<ConceptRef>` or `Vec<ConceptRef>` is
///   a reference field.
///
/// # Capabilities
///
/// A capability flag only wires the accessor; the struct must implement the
/// matching trait itself:
///
/// | Flag | Trait |
/// |------|-------|
/// | `expand` | `MacroConcept` |
/// | `validate` | `ValidatedConcept` |
/// | `initialize` | `AlternativeInitialization` |
/// | `error` | `ErrorConcept` |
/// | `dependency` | `DependencyConcept` |
/// | `sql_object` | `SqlObjectConcept` |
///
/// # Example
///
/// ```rust,ignore
/// use concept_forge::{Concept, ConceptRef};
///
/// #[derive(Debug, Clone, Concept)]
/// #[concept(keyword = "Entity", family = "DataStructure")]
/// pub struct EntityInfo {
///     #[concept(key)]
///     pub module: ConceptRef,
///
///     #[concept(key)]
///     pub name: String
/// }
/// ```
#[proc_macro_derive(Concept, attributes(concept))]
pub fn derive_concept(input: TokenStream) -> TokenStream {
    concept::derive(input)
}
