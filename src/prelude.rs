// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for declaring concept kinds and their plugins.
//!
//! # Usage
//!
//! ```rust
//! use concept_forge::prelude::*;
//!
//! #[derive(Debug, Clone, Concept)]
//! pub struct NoteInfo {
//!     #[concept(key)]
//!     pub name: String
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register_generator::<NoteInfo, _>(
//!     |note: &NoteInfo, ctx: &mut GenerationContext<'_>| -> Result<(), GenerateError> {
//!         ctx.file("notes.txt").insert_code(&note.name);
//!         Ok(())
//!     }
//! );
//! ```

pub use crate::{
    AlternativeInitialization, Compilation, CompileError, Compiler, CompilerOptions, Concept,
    ConceptKey, ConceptKind, ConceptRef, DependencyConcept, ErrorConcept, ErrorPolicy,
    Initialization, MacroConcept, SqlObjectConcept, ValidatedConcept,
    codegen::{DatabaseGenerator, GenerationContext, Generator, PluginRegistry},
    error::{GenerateError, MacroError},
    expand::MacroContext,
    model::ConceptModel,
    order::{Dependency, DependencySource},
    template::Tag
};
