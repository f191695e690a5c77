// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dependency graph and deterministic topological ordering.
//!
//! # Edge sources
//!
//! | Source | Origin |
//! |--------|--------|
//! | [`DependencySource::Reference`] | a reference field of the dependent |
//! | [`DependencySource::Declared`] | a dependency concept (`SqlDependsOn*`) |
//! | [`DependencySource::Plugin`] | a registered dependency extender |
//!
//! Self edges and edges to keys outside the model are dropped. Ties between
//! unconstrained concepts are broken by key, so identical input always gives
//! byte-identical order.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap}
};

use tracing::debug;

use crate::{
    codegen::PluginRegistry,
    concept::{ConceptKey, ConceptRef},
    error::CompileError,
    model::ConceptModel
};

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencySource {
    /// Reference field (Rust name).
    Reference(&'static str),
    Declared,
    Plugin
}

/// Ordering constraint: `dependent` comes after `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub dependent:  ConceptKey,
    pub depends_on: ConceptKey,
    pub source:     DependencySource
}

impl Dependency {
    #[must_use]
    pub fn new(dependent: &ConceptRef, depends_on: &ConceptRef, source: DependencySource) -> Self {
        Self {
            dependent:  dependent.key().clone(),
            depends_on: depends_on.key().clone(),
            source
        }
    }

    /// Edges from `dependent` to each target, never to itself.
    ///
    /// ```rust
    /// use concept_forge::{ConceptRef, order::Dependency};
    ///
    /// let logging = ConceptRef::from_values("Logging", ["Demo", "Invoice"]);
    /// let targets = [
    ///     ConceptRef::from_values("Property", ["Demo", "Invoice", "Code"]),
    ///     logging.clone(),
    /// ];
    /// assert_eq!(Dependency::bulk(&logging, &targets).len(), 1);
    /// ```
    pub fn bulk<'a>(
        dependent: &ConceptRef,
        targets: impl IntoIterator<Item = &'a ConceptRef>
    ) -> Vec<Self> {
        targets
            .into_iter()
            .filter(|target| *target != dependent)
            .map(|target| Self::new(dependent, target, DependencySource::Plugin))
            .collect()
    }
}

/// Dependency graph over the keys of a closed model.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes:      BTreeMap<ConceptKey, String>,
    depends_on: BTreeMap<ConceptKey, BTreeSet<ConceptKey>>,
    dependents: BTreeMap<ConceptKey, BTreeSet<ConceptKey>>,
    edges:      BTreeSet<Dependency>
}

impl DependencyGraph {
    /// Collect reference, declared and plugin edges for `model`.
    #[must_use]
    pub fn build(model: &ConceptModel, registry: &PluginRegistry) -> Self {
        let mut graph = Self::default();
        for concept in model.iter() {
            graph.add_node(concept.key(), concept.description());
        }

        for concept in model.iter() {
            let key = concept.key();
            for reference in concept.references() {
                graph.add_edge(Dependency {
                    dependent:  key.clone(),
                    depends_on: reference.target.key().clone(),
                    source:     DependencySource::Reference(reference.field)
                });
            }

            if let Some(declared) = concept.as_dependency() {
                graph.add_edge(Dependency::new(
                    declared.dependent(),
                    declared.depends_on(),
                    DependencySource::Declared
                ));
            }

            for edge in registry.extend_dependencies(concept, model) {
                graph.add_edge(edge);
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built dependency graph"
        );
        graph
    }

    /// Graph over explicit nodes `(key, description)` and edges.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = (ConceptKey, String)>,
        edges: impl IntoIterator<Item = Dependency>
    ) -> Self {
        let mut graph = Self::default();
        for (key, description) in nodes {
            graph.add_node(key, description);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    fn add_node(&mut self, key: ConceptKey, description: String) {
        self.depends_on.entry(key.clone()).or_default();
        self.dependents.entry(key.clone()).or_default();
        self.nodes.insert(key, description);
    }

    fn add_edge(&mut self, edge: Dependency) {
        if edge.dependent == edge.depends_on
            || !self.nodes.contains_key(&edge.dependent)
            || !self.nodes.contains_key(&edge.depends_on)
        {
            return;
        }
        self.depends_on
            .entry(edge.dependent.clone())
            .or_default()
            .insert(edge.depends_on.clone());
        self.dependents
            .entry(edge.depends_on.clone())
            .or_default()
            .insert(edge.dependent.clone());
        self.edges.insert(edge);
    }

    /// All kept edges, sorted.
    pub fn edges(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct prerequisites of `key`.
    pub fn dependencies_of(&self, key: &ConceptKey) -> impl Iterator<Item = &ConceptKey> {
        self.depends_on.get(key).into_iter().flatten()
    }

    /// Creation order: every concept after everything it depends on, ties
    /// broken by key.
    ///
    /// # Errors
    ///
    /// [`CompileError::Cycle`] naming the concepts of one cycle.
    pub fn order(&self) -> Result<Vec<ConceptKey>, CompileError> {
        let mut remaining: BTreeMap<&ConceptKey, usize> = self
            .depends_on
            .iter()
            .map(|(key, deps)| (key, deps.len()))
            .collect();
        let mut ready: BinaryHeap<Reverse<&ConceptKey>> = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(key, _)| Reverse(*key))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse(key)) = ready.pop() {
            remaining.remove(key);
            order.push(key.clone());
            for dependent in self.dependents.get(key).into_iter().flatten() {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let stuck: BTreeSet<&ConceptKey> = remaining.keys().copied().collect();
            return Err(CompileError::Cycle {
                concepts: self.find_cycle(&stuck)
            });
        }
        Ok(order)
    }

    /// Removal order: the reverse of [`order`](Self::order).
    ///
    /// # Errors
    ///
    /// Same as [`order`](Self::order).
    pub fn removal_order(&self) -> Result<Vec<ConceptKey>, CompileError> {
        let mut order = self.order()?;
        order.reverse();
        Ok(order)
    }

    /// Partial order as antichains: layer `n` holds the concepts whose
    /// longest dependency chain has length `n`.
    ///
    /// # Errors
    ///
    /// Same as [`order`](Self::order).
    pub fn layers(&self) -> Result<Vec<Vec<ConceptKey>>, CompileError> {
        let mut depth: BTreeMap<&ConceptKey, usize> = BTreeMap::new();
        let mut layers: Vec<Vec<ConceptKey>> = Vec::new();

        for key in self.order()? {
            let level = self
                .dependencies_of(&key)
                .filter_map(|dep| depth.get(dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            if layers.len() <= level {
                layers.resize_with(level + 1, Vec::new);
            }
            layers[level].push(key.clone());
            if let Some((stored, _)) = self.nodes.get_key_value(&key) {
                depth.insert(stored, level);
            }
        }

        for layer in &mut layers {
            layer.sort();
        }
        Ok(layers)
    }

    /// `keys` plus everything that transitively depends on them, sorted.
    #[must_use]
    pub fn dependents_closure<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a ConceptKey>
    ) -> BTreeSet<ConceptKey> {
        let mut closure = BTreeSet::new();
        let mut stack: Vec<ConceptKey> = keys.into_iter().cloned().collect();

        while let Some(key) = stack.pop() {
            if !closure.insert(key.clone()) {
                continue;
            }
            for dependent in self.dependents.get(&key).into_iter().flatten() {
                if !closure.contains(dependent) {
                    stack.push(dependent.clone());
                }
            }
        }
        closure
    }

    /// One cycle among `stuck` (nodes Kahn could not release), as
    /// descriptions closed on the first element.
    fn find_cycle(&self, stuck: &BTreeSet<&ConceptKey>) -> Vec<String> {
        let Some(start) = stuck.first().copied() else {
            return Vec::new();
        };

        // Every stuck node has a stuck prerequisite; walking them must
        // revisit a node.
        let mut path: Vec<&ConceptKey> = Vec::new();
        let mut current = start;
        loop {
            if let Some(position) = path.iter().position(|key| *key == current) {
                let mut cycle: Vec<String> = path[position..]
                    .iter()
                    .map(|key| self.describe(key))
                    .collect();
                cycle.push(self.describe(current));
                return cycle;
            }
            path.push(current);
            let next = self
                .dependencies_of(current)
                .find(|dep| stuck.contains(dep));
            match next {
                Some(next) => current = next,
                None => return path.iter().map(|key| self.describe(key)).collect()
            }
        }
    }

    fn describe(&self, key: &ConceptKey) -> String {
        self.nodes
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(name: &str) -> ConceptKey {
        ConceptKey::from_raw(format!("Node {name}"))
    }

    fn edge(dependent: &str, depends_on: &str) -> Dependency {
        Dependency {
            dependent:  key(dependent),
            depends_on: key(depends_on),
            source:     DependencySource::Declared
        }
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        DependencyGraph::from_edges(
            nodes.iter().map(|n| (key(n), format!("Node {n}"))),
            edges.iter().map(|(a, b)| edge(a, b))
        )
    }

    fn names(keys: &[ConceptKey]) -> Vec<&str> {
        keys.iter().map(ConceptKey::values).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let graph = graph(&["a", "b", "c"], &[("a", "c"), ("b", "a")]);
        assert_eq!(names(&graph.order().unwrap()), vec!["c", "a", "b"]);
    }

    #[test]
    fn ties_are_broken_by_key() {
        let graph = graph(&["d", "b", "c", "a"], &[]);
        assert_eq!(names(&graph.order().unwrap()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn removal_is_reverse_of_creation() {
        let graph = graph(&["a", "b"], &[("b", "a")]);
        assert_eq!(names(&graph.removal_order().unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn two_node_cycle_names_both() {
        let graph = graph(&["A", "B", "C"], &[("A", "B"), ("B", "A"), ("C", "A")]);
        let Err(CompileError::Cycle { concepts }) = graph.order() else {
            panic!("expected a cycle");
        };
        assert_eq!(concepts, vec!["Node A", "Node B", "Node A"]);
    }

    #[test]
    fn cycle_reported_without_dangling_prefix() {
        let graph = graph(
            &["a", "x", "y", "z"],
            &[("a", "x"), ("x", "y"), ("y", "z"), ("z", "x")]
        );
        let Err(CompileError::Cycle { concepts }) = graph.order() else {
            panic!("expected a cycle");
        };
        assert_eq!(concepts, vec!["Node x", "Node y", "Node z", "Node x"]);
    }

    #[test]
    fn self_and_unknown_edges_are_dropped() {
        let graph = graph(&["a"], &[("a", "a"), ("a", "ghost")]);
        assert_eq!(graph.edges().count(), 0);
        assert_eq!(names(&graph.order().unwrap()), vec!["a"]);
    }

    #[test]
    fn bulk_excludes_reflexive_edge() {
        let owner = ConceptRef::from_values("Entity", ["Demo", "Invoice"]);
        let targets = vec![
            ConceptRef::from_values("Property", ["Demo", "Invoice", "Code"]),
            owner.clone(),
            ConceptRef::from_values("Property", ["Demo", "Invoice", "Total"]),
        ];
        let edges = Dependency::bulk(&owner, &targets);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.dependent != e.depends_on));
    }

    #[test]
    fn layers_group_independent_concepts() {
        let graph = graph(&["a", "b", "c", "d"], &[("c", "a"), ("c", "b"), ("d", "c")]);
        let layers = graph.layers().unwrap();
        let layers: Vec<Vec<&str>> = layers.iter().map(|l| names(l)).collect();
        assert_eq!(layers, vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
    }

    #[test]
    fn closure_follows_dependents() {
        let graph = graph(&["a", "b", "c", "d"], &[("b", "a"), ("c", "b")]);
        let closure = graph.dependents_closure([&key("a")]);
        let closure: Vec<_> = closure.iter().map(ConceptKey::values).collect();
        assert_eq!(closure, vec!["a", "b", "c"]);
    }
}
