// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Capability traits a concept kind may implement.
//!
//! Kinds opt in with `#[concept(expand, validate, ...)]`; the derive macro
//! then wires the matching accessor on [`Concept`](super::Concept).

use super::{Concept, ConceptRef};
use crate::{
    error::MacroError,
    expand::MacroContext,
    model::ConceptModel,
    sql::SqlObject
};

/// Macro expansion: produce the concepts this one implies.
///
/// Must be a pure function of `self` and the model visible through the
/// context. Returning an empty vector means "nothing to add yet"; a later pass
/// asks again once more of the model exists.
pub trait MacroConcept {
    /// # Errors
    ///
    /// Any error aborts the whole compilation.
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError>;
}

/// Semantic validation against the closed model.
pub trait ValidatedConcept {
    /// # Errors
    ///
    /// Returns a human-readable message; the caller prefixes it with the
    /// concept's description.
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String>;
}

/// Outcome of one [`AlternativeInitialization::initialize`] attempt.
#[derive(Debug)]
pub enum Initialization {
    /// Derived fields cannot be computed yet; the reason is reported if the
    /// concept is still pending at the fixed point.
    Pending(String),

    /// Derived fields are set; auxiliary concepts to merge into the model.
    Done(Vec<Box<dyn Concept>>)
}

impl Initialization {
    /// Done without auxiliary concepts.
    #[must_use]
    pub fn done() -> Self {
        Self::Done(Vec::new())
    }
}

/// Computes non-key fields before the concept is exposed to macros and
/// generators.
///
/// Key fields must not change here: the concept is already stored under its
/// key.
pub trait AlternativeInitialization {
    /// # Errors
    ///
    /// Any error aborts the whole compilation.
    fn initialize(&mut self, model: &ConceptModel) -> Result<Initialization, MacroError>;
}

/// Deferred authoring error.
///
/// A macro that cannot produce valid output emits an error concept instead of
/// failing; if the concept is still present after the fixed point, the
/// compilation reports it.
pub trait ErrorConcept {
    fn error_message(&self) -> String;
}

/// Explicit ordering edge `dependent -> depends_on`.
pub trait DependencyConcept {
    fn dependent(&self) -> &ConceptRef;

    fn depends_on(&self) -> &ConceptRef;
}

/// Concept producing a database-visible object.
pub trait SqlObjectConcept {
    fn sql_object(&self) -> SqlObject;
}
