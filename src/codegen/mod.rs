// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Code and SQL generation over an ordered model.
//!
//! # Flow
//!
//! ```text
//! for key in creation order:
//!     source generators  → GenerationContext::file(..) builders
//!     database generator → (create, remove) scripts, markers unresolved
//! then:
//!     resolve every create/remove script against the shared SQL builder
//!     build every file builder
//! ```
//!
//! Markers are resolved last so a concept generated late can still append
//! into a tag owned by a concept generated early.

mod migration;
mod registry;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use self::{
    migration::{MigrationPlan, load_applications, save_applications},
    registry::{DatabaseGenerator, DependencyExtender, Generator, PluginRegistry}
};
use crate::{
    concept::ConceptKey,
    dialect::SqlDialect,
    error::CompileError,
    model::ConceptModel,
    order::DependencyGraph,
    template::CodeBuilder
};

/// Paired create / remove scripts of one database-backed concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptApplication {
    pub key:        ConceptKey,
    pub create_sql: String,
    pub remove_sql: String,

    /// Database-backed concepts this one needs, looking through concepts
    /// without a database object.
    #[serde(default)]
    pub depends_on: Vec<ConceptKey>
}

/// Everything one compilation emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    /// Source files by name.
    pub files: BTreeMap<String, String>,

    /// Database applications in creation order.
    pub database: Vec<ConceptApplication>,

    /// Crates or assemblies the generated sources require.
    pub references: BTreeSet<String>
}

impl GeneratedArtifacts {
    /// All create scripts in creation order.
    #[must_use]
    pub fn create_script(&self) -> String {
        join_scripts(self.database.iter().map(|app| app.create_sql.as_str()))
    }

    /// All remove scripts in removal order.
    #[must_use]
    pub fn remove_script(&self) -> String {
        join_scripts(self.database.iter().rev().map(|app| app.remove_sql.as_str()))
    }
}

pub(crate) fn join_scripts<'a>(scripts: impl Iterator<Item = &'a str>) -> String {
    scripts
        .filter(|script| !script.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// State shared by all generators of one run.
pub struct GenerationContext<'a> {
    model:      &'a ConceptModel,
    dialect:    &'a dyn SqlDialect,
    files:      BTreeMap<String, CodeBuilder>,
    sql:        CodeBuilder,
    references: BTreeSet<String>,
    max_depth:  usize
}

impl<'a> GenerationContext<'a> {
    #[must_use]
    pub fn new(model: &'a ConceptModel, dialect: &'a dyn SqlDialect, max_depth: usize) -> Self {
        Self {
            model,
            dialect,
            files: BTreeMap::new(),
            sql: CodeBuilder::with_max_depth(max_depth),
            references: BTreeSet::new(),
            max_depth
        }
    }

    #[must_use]
    pub fn model(&self) -> &'a ConceptModel {
        self.model
    }

    #[must_use]
    pub fn dialect(&self) -> &'a dyn SqlDialect {
        self.dialect
    }

    /// Builder of the named output file, created on first use.
    pub fn file(&mut self, name: &str) -> &mut CodeBuilder {
        let max_depth = self.max_depth;
        self.files
            .entry(name.to_string())
            .or_insert_with(|| CodeBuilder::with_max_depth(max_depth))
    }

    /// Builder whose tags are visible inside every create and remove script.
    pub fn sql(&mut self) -> &mut CodeBuilder {
        &mut self.sql
    }

    /// Record that generated sources need `name`.
    pub fn require_reference(&mut self, name: impl Into<String>) {
        self.references.insert(name.into());
    }
}

/// Run every plugin over `order` and resolve the results.
///
/// # Errors
///
/// - [`CompileError::Generator`] when a plugin fails
/// - [`CompileError::Template`] when tag resolution fails
/// - [`CompileError::Internal`] when `order` names a key missing from the
///   model
pub fn generate(
    model: &ConceptModel,
    graph: &DependencyGraph,
    order: &[ConceptKey],
    registry: &PluginRegistry,
    dialect: &dyn SqlDialect,
    max_depth: usize
) -> Result<GeneratedArtifacts, CompileError> {
    let mut ctx = GenerationContext::new(model, dialect, max_depth);
    let mut scripts: Vec<(ConceptKey, String, String)> = Vec::new();

    for key in order {
        let concept = model
            .get(key)
            .ok_or_else(|| CompileError::Internal(format!("ordered key {key} is not in the model")))?;
        registry.generate(concept, &mut ctx)?;
        if let Some((create, remove)) = registry.database_sql(concept, &mut ctx)? {
            scripts.push((key.clone(), create, remove));
        }
    }

    let GenerationContext {
        files,
        mut sql,
        references,
        ..
    } = ctx;

    let database_keys: BTreeSet<&ConceptKey> = scripts.iter().map(|(key, ..)| key).collect();
    let mut database = Vec::with_capacity(scripts.len());
    for (key, create, remove) in &scripts {
        database.push(ConceptApplication {
            key:        key.clone(),
            create_sql: sql.resolve_text(create)?,
            remove_sql: sql.resolve_text(remove)?,
            depends_on: database_dependencies(graph, key, &database_keys)
        });
    }
    sql.report_orphans();

    let mut built = BTreeMap::new();
    for (name, builder) in files {
        debug!(file = %name, "resolving generated file");
        built.insert(name, builder.build()?);
    }

    info!(
        files = built.len(),
        database = database.len(),
        "code generation finished"
    );
    Ok(GeneratedArtifacts {
        files: built,
        database,
        references
    })
}

/// Nearest database-backed prerequisites of `key`.
fn database_dependencies(
    graph: &DependencyGraph,
    key: &ConceptKey,
    database: &BTreeSet<&ConceptKey>
) -> Vec<ConceptKey> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut stack: Vec<&ConceptKey> = graph.dependencies_of(key).collect();

    while let Some(next) = stack.pop() {
        if !visited.insert(next) {
            continue;
        }
        if database.contains(next) {
            found.insert(next.clone());
        } else {
            stack.extend(graph.dependencies_of(next));
        }
    }
    found.into_iter().collect()
}
