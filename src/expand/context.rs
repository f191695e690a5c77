// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! What a macro sees while expanding.

use crate::{
    concept::{Concept, ConceptRef},
    model::ConceptModel,
    sql::{SqlObjectCache, sql_dependencies}
};

/// Read-only model view plus run-scoped services.
pub struct MacroContext<'a> {
    model: &'a ConceptModel,
    cache: &'a mut SqlObjectCache
}

impl<'a> MacroContext<'a> {
    #[must_use]
    pub fn new(model: &'a ConceptModel, cache: &'a mut SqlObjectCache) -> Self {
        Self { model, cache }
    }

    /// Model as of the start of the current pass.
    #[must_use]
    pub fn model(&self) -> &'a ConceptModel {
        self.model
    }

    /// Dependency concepts for the objects `sql` references.
    pub fn sql_dependencies(&mut self, dependent: &ConceptRef, sql: &str) -> Vec<Box<dyn Concept>> {
        sql_dependencies(dependent, sql, self.model, self.cache)
    }
}
