// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Deferred authoring error.
//!
//! Macros that detect a problem they cannot report directly create a
//! `ConceptError`; the check phase reports it once expansion has converged.

use crate::{
    Concept,
    concept::{ConceptRef, ErrorConcept}
};

#[derive(Debug, Clone, Concept)]
#[concept(keyword = "ConceptError", error)]
pub struct ConceptErrorInfo {
    /// Concept the error is reported for.
    #[concept(key)]
    pub origin: ConceptRef,

    pub message: String
}

impl ErrorConcept for ConceptErrorInfo {
    fn error_message(&self) -> String {
        self.message.clone()
    }
}
