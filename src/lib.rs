// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! # concept-forge
//!
//! Compiler for declarative domain models expressed as a graph of typed
//! concepts.
//!
//! A model starts as a handful of authored concepts. Macro concepts expand it
//! until nothing new appears, the closed model is checked, a dependency graph
//! orders it, and per-kind plugins turn it into source files and paired
//! create/remove database scripts.
//!
//! ## Quick Start
//!
//! ```rust
//! use concept_forge::{
//!     Compiler, CompilerOptions, Concept,
//!     dom::{self, EntityInfo, ModuleInfo, PropertyInfo, PropertyType}
//! };
//!
//! let demo = ModuleInfo::new("Demo");
//! let invoice = EntityInfo::new(&demo.reference(), "Invoice");
//! let code = PropertyInfo::new(&invoice.reference(), "Code", PropertyType::ShortString);
//!
//! let concepts: Vec<Box<dyn Concept>> =
//!     vec![Box::new(code), Box::new(invoice), Box::new(demo)];
//! let compilation = Compiler::new(CompilerOptions::default(), dom::registry())
//!     .compile(concepts)
//!     .unwrap();
//!
//! let script = compilation.artifacts.create_script();
//! assert!(script.find("CREATE SCHEMA").unwrap() < script.find("CREATE TABLE").unwrap());
//! assert!(compilation.artifacts.files["demo.rs"].contains("pub code: String"));
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! authored concepts ──► ConceptModel (keyed, indexed)
//!                          │
//!                          ▼
//!                   MacroExpander ◄── MacroConcept / AlternativeInitialization
//!                          │ fixed point
//!                          ▼
//!                     check_model ◄── ValidatedConcept / ErrorConcept
//!                          │
//!                          ▼
//!                   DependencyGraph ◄── references, DependencyConcept, extenders
//!                          │ creation order
//!                          ▼
//!                   codegen::generate ◄── Generator / DatabaseGenerator
//!                          │
//!                          ▼
//!                 files + ConceptApplication scripts ──► MigrationPlan
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | [`ConceptModel`](model::ConceptModel) with typed queries |
//! | [`expand`] | macro expansion to a fixed point and closed-model checks |
//! | [`order`] | dependency graph and deterministic ordering |
//! | [`template`] | tag markers and the [`CodeBuilder`](template::CodeBuilder) |
//! | [`codegen`] | plugin registry, generation, migrations |
//! | [`sql`] | SQL reference extraction and `SqlDependsOn*` concepts |
//! | [`dialect`] | database dialect snippets |
//! | [`dom`] | built-in concept library |
//! | [`auto_code`] | reference semantics of generated numbering |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

extern crate self as concept_forge;

pub mod auto_code;
pub mod codegen;
mod compiler;
mod concept;
pub mod config;
pub mod dialect;
pub mod dom;
pub mod error;
pub mod expand;
pub mod model;
pub mod order;
pub mod prelude;
pub mod sql;
pub mod template;

/// Derive macro declaring a concept kind.
pub use concept_forge_derive::Concept;

pub use crate::{
    compiler::{Compilation, Compiler},
    concept::{
        AlternativeInitialization, Concept, ConceptKey, ConceptKind, ConceptRef,
        DependencyConcept, ErrorConcept, FieldReference, Initialization, KeyFragment,
        MacroConcept, ReferenceField, SqlObjectConcept, ValidatedConcept, escape_fragment,
        reference_to, unescape_fragment
    },
    config::{CompilerOptions, ErrorPolicy},
    error::{CompileError, CompileResult}
};
