// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-kind plugin registry.
//!
//! Plugins are registered against a concrete concept kind and looked up by
//! `TypeId` at generation time:
//!
//! | Plugin | Produces |
//! |--------|----------|
//! | [`Generator`] | fragments in source file builders |
//! | [`DatabaseGenerator`] | paired create / remove SQL |
//! | [`DependencyExtender`] | extra ordering edges |
//!
//! Plain functions and closures with the right signature are generators and
//! extenders.

use std::{any::TypeId, collections::HashMap, marker::PhantomData};

use super::GenerationContext;
use crate::{
    concept::{Concept, ConceptKind},
    error::GenerateError,
    model::ConceptModel,
    order::Dependency
};

/// Writes source code for one concept kind.
pub trait Generator<C: ConceptKind>: Send + Sync {
    /// # Errors
    ///
    /// Template or plugin failures abort the compilation.
    fn generate(&self, concept: &C, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError>;
}

impl<C, F> Generator<C> for F
where
    C: ConceptKind,
    F: Fn(&C, &mut GenerationContext<'_>) -> Result<(), GenerateError> + Send + Sync
{
    fn generate(&self, concept: &C, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError> {
        self(concept, ctx)
    }
}

/// Produces the database object of one concept kind.
///
/// The create script may contain tag markers of the shared SQL builder; they
/// are resolved after every generator has run. The remove script must undo
/// the create script.
pub trait DatabaseGenerator<C: ConceptKind>: Send + Sync {
    /// # Errors
    ///
    /// Template or plugin failures abort the compilation.
    fn create_sql(&self, concept: &C, ctx: &mut GenerationContext<'_>)
    -> Result<String, GenerateError>;

    /// # Errors
    ///
    /// Plugin failures abort the compilation.
    fn remove_sql(&self, concept: &C, ctx: &GenerationContext<'_>) -> Result<String, GenerateError>;
}

/// Contributes ordering edges not visible from reference fields.
pub trait DependencyExtender<C: ConceptKind>: Send + Sync {
    fn extend(&self, concept: &C, model: &ConceptModel) -> Vec<Dependency>;
}

impl<C, F> DependencyExtender<C> for F
where
    C: ConceptKind,
    F: Fn(&C, &ConceptModel) -> Vec<Dependency> + Send + Sync
{
    fn extend(&self, concept: &C, model: &ConceptModel) -> Vec<Dependency> {
        self(concept, model)
    }
}

trait ErasedGenerator: Send + Sync {
    fn generate(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<(), GenerateError>;
}

trait ErasedDatabaseGenerator: Send + Sync {
    fn create_sql(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError>;

    fn remove_sql(
        &self,
        concept: &dyn Concept,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError>;
}

trait ErasedExtender: Send + Sync {
    fn extend(&self, concept: &dyn Concept, model: &ConceptModel) -> Vec<Dependency>;
}

struct Typed<C, P> {
    plugin: P,
    kind:   PhantomData<fn() -> C>
}

impl<C, P> Typed<C, P> {
    fn new(plugin: P) -> Self {
        Self {
            plugin,
            kind: PhantomData
        }
    }
}

fn downcast<C: ConceptKind>(concept: &dyn Concept) -> Result<&C, GenerateError> {
    concept.downcast_ref::<C>().ok_or_else(|| {
        GenerateError::plugin(
            concept.description(),
            format!("plugin registered for {} received another kind", C::KEYWORD)
        )
    })
}

impl<C: ConceptKind, G: Generator<C>> ErasedGenerator for Typed<C, G> {
    fn generate(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<(), GenerateError> {
        self.plugin.generate(downcast::<C>(concept)?, ctx)
    }
}

impl<C: ConceptKind, D: DatabaseGenerator<C>> ErasedDatabaseGenerator for Typed<C, D> {
    fn create_sql(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        self.plugin.create_sql(downcast::<C>(concept)?, ctx)
    }

    fn remove_sql(
        &self,
        concept: &dyn Concept,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        self.plugin.remove_sql(downcast::<C>(concept)?, ctx)
    }
}

impl<C: ConceptKind, E: DependencyExtender<C>> ErasedExtender for Typed<C, E> {
    fn extend(&self, concept: &dyn Concept, model: &ConceptModel) -> Vec<Dependency> {
        concept
            .downcast_ref::<C>()
            .map(|typed| self.plugin.extend(typed, model))
            .unwrap_or_default()
    }
}

/// All plugins of a compilation, keyed by concept kind.
#[derive(Default)]
pub struct PluginRegistry {
    generators: HashMap<TypeId, Vec<Box<dyn ErasedGenerator>>>,
    database:   HashMap<TypeId, Box<dyn ErasedDatabaseGenerator>>,
    extenders:  HashMap<TypeId, Vec<Box<dyn ErasedExtender>>>
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("generators", &self.generators.values().map(Vec::len).sum::<usize>())
            .field("database", &self.database.len())
            .field("extenders", &self.extenders.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source generator for kind `C`; generators of one kind run in
    /// registration order.
    pub fn register_generator<C, G>(&mut self, generator: G) -> &mut Self
    where
        C: ConceptKind,
        G: Generator<C> + 'static
    {
        self.generators
            .entry(TypeId::of::<C>())
            .or_default()
            .push(Box::new(Typed::<C, G>::new(generator)));
        self
    }

    /// Set the database generator for kind `C`, replacing any previous one.
    pub fn register_database<C, D>(&mut self, generator: D) -> &mut Self
    where
        C: ConceptKind,
        D: DatabaseGenerator<C> + 'static
    {
        self.database
            .insert(TypeId::of::<C>(), Box::new(Typed::<C, D>::new(generator)));
        self
    }

    /// Add a dependency extender for kind `C`.
    pub fn register_extender<C, E>(&mut self, extender: E) -> &mut Self
    where
        C: ConceptKind,
        E: DependencyExtender<C> + 'static
    {
        self.extenders
            .entry(TypeId::of::<C>())
            .or_default()
            .push(Box::new(Typed::<C, E>::new(extender)));
        self
    }

    /// Edges every extender registered for the concept's kind contributes.
    pub fn extend_dependencies(&self, concept: &dyn Concept, model: &ConceptModel) -> Vec<Dependency> {
        self.extenders
            .get(&concept.as_any().type_id())
            .into_iter()
            .flatten()
            .flat_map(|extender| extender.extend(concept, model))
            .collect()
    }

    /// Whether the concept's kind has a database generator.
    #[must_use]
    pub fn has_database(&self, concept: &dyn Concept) -> bool {
        self.database.contains_key(&concept.as_any().type_id())
    }

    pub(crate) fn generate(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<(), GenerateError> {
        for generator in self
            .generators
            .get(&concept.as_any().type_id())
            .into_iter()
            .flatten()
        {
            generator.generate(concept, ctx)?;
        }
        Ok(())
    }

    /// `(create, remove)` scripts, if the kind has a database generator.
    pub(crate) fn database_sql(
        &self,
        concept: &dyn Concept,
        ctx: &mut GenerationContext<'_>
    ) -> Result<Option<(String, String)>, GenerateError> {
        let Some(generator) = self.database.get(&concept.as_any().type_id()) else {
            return Ok(None);
        };
        let create = generator.create_sql(concept, ctx)?;
        let remove = generator.remove_sql(concept, ctx)?;
        Ok(Some((create, remove)))
    }
}
