// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Compilation pipeline.
//!
//! ```text
//! initial concepts
//!   → MacroExpander::expand_and_check   (closed, validated model)
//!   → DependencyGraph::build + order    (creation order)
//!   → codegen::generate                 (files + database applications)
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    codegen::{self, GeneratedArtifacts, PluginRegistry},
    concept::{Concept, ConceptKey},
    config::CompilerOptions,
    dialect::{PostgresDialect, SqlDialect},
    error::CompileError,
    expand::{MacroExpander, PassOrder},
    model::ConceptModel,
    order::DependencyGraph,
    sql::SqlObjectCache
};

/// Result of a full compilation.
#[derive(Debug)]
pub struct Compilation {
    /// Closed model.
    pub model: ConceptModel,

    /// Dependency graph over the closed model.
    pub graph: DependencyGraph,

    /// Creation order.
    pub order: Vec<ConceptKey>,

    pub artifacts: GeneratedArtifacts
}

/// One configured compiler; reusable across runs.
pub struct Compiler {
    options:  CompilerOptions,
    registry: PluginRegistry,
    dialect:  Arc<dyn SqlDialect>,
    order:    Arc<dyn Fn() -> PassOrder + Send + Sync>
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Compiler {
    /// Compiler targeting PostgreSQL.
    #[must_use]
    pub fn new(options: CompilerOptions, registry: PluginRegistry) -> Self {
        Self {
            options,
            registry,
            dialect: Arc::new(PostgresDialect),
            order: Arc::new(PassOrder::default)
        }
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: impl SqlDialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// Macro pass order used by every run; called once per run.
    #[must_use]
    pub fn with_pass_order(
        mut self,
        order: impl Fn() -> PassOrder + Send + Sync + 'static
    ) -> Self {
        self.order = Arc::new(order);
        self
    }

    #[must_use]
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Expand and check `concepts` into a closed model.
    ///
    /// # Errors
    ///
    /// Macro failures, non-convergence and authoring errors.
    pub fn build_model(
        &self,
        concepts: impl IntoIterator<Item = Box<dyn Concept>>
    ) -> Result<ConceptModel, CompileError> {
        let mut model = ConceptModel::new();
        for concept in concepts {
            model.insert(concept);
        }

        let mut cache = SqlObjectCache::new();
        MacroExpander::new(self.options.clone())
            .with_order((self.order)())
            .expand_and_check(&mut model, &mut cache)?;
        info!(
            sql_texts = cache.len(),
            cache_hits = cache.hits(),
            "SQL dependency inference finished"
        );
        Ok(model)
    }

    /// Full pipeline.
    ///
    /// # Errors
    ///
    /// Everything [`build_model`](Self::build_model) reports, dependency
    /// cycles, and generation failures.
    pub fn compile(
        &self,
        concepts: impl IntoIterator<Item = Box<dyn Concept>>
    ) -> Result<Compilation, CompileError> {
        let model = self.build_model(concepts)?;
        let graph = DependencyGraph::build(&model, &self.registry);
        let order = graph.order()?;
        let artifacts = codegen::generate(
            &model,
            &graph,
            &order,
            &self.registry,
            self.dialect.as_ref(),
            self.options.max_tag_depth
        )?;

        info!(concepts = order.len(), "compilation finished");
        Ok(Compilation {
            model,
            graph,
            order,
            artifacts
        })
    }
}
