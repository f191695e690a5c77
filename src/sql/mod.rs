// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! SQL dependency inference.
//!
//! A best-effort scan of SQL text for referenced `schema.name` objects, used
//! to add ordering edges nobody declared by hand. It is not a parser: a miss
//! silently yields fewer edges, and the remedy is a manual
//! [`SqlDependsOnInfo`].
//!
//! # Pipeline
//!
//! ```text
//! raw SQL
//!   │
//!   ├── lexer.rs   → strip strings, literals, comments; park [bracketed] names
//!   ├── extract.rs → FROM/JOIN/INTO/MERGE/USING, schema.name(, cross joins
//!   ├── cache.rs   → per-run memo keyed by the raw text
//!   └── depends.rs → resolve against the model, emit typed dependency concepts
//! ```

mod cache;
mod depends;
mod extract;
mod lexer;

use std::fmt;

pub use cache::SqlObjectCache;
pub use depends::{
    SqlDependsOnDataStructureInfo, SqlDependsOnInfo, SqlDependsOnSqlFunctionInfo,
    SqlDependsOnSqlViewInfo, sql_dependencies
};
pub use extract::extract_sql_objects;
pub use lexer::strip_noise;

use crate::concept::{ConceptRef, unescape_fragment};

/// `schema.name` pair found in SQL text, as written (case preserved).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqlObjectName {
    pub schema: String,
    pub name:   String
}

impl SqlObjectName {
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name:   name.into()
        }
    }
}

impl fmt::Display for SqlObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Kind of database-visible object a concept produces.
///
/// Matching on this enum is exhaustive, so a new object kind cannot be added
/// without deciding which dependency concept it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqlObjectKind {
    /// Table or any other data structure.
    DataStructure,
    SqlView,
    SqlFunction,
    /// Union view over the subtypes of a polymorphic data structure.
    PolymorphicUnionView
}

/// Database-visible object produced by a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlObject {
    pub schema: String,
    pub name:   String,
    pub kind:   SqlObjectKind
}

impl SqlObject {
    /// Object living in the schema named after `module` (a `Module`
    /// reference with a single key value).
    #[must_use]
    pub fn from_module(module: &ConceptRef, name: &str, kind: SqlObjectKind) -> Self {
        Self {
            schema: unescape_fragment(module.key().values()),
            name:   name.to_string(),
            kind
        }
    }
}
