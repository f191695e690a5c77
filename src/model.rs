// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Concept model: insertion-ordered arena with query indices.
//!
//! # Indices
//!
//! | Index | Key | Used by |
//! |-------|-----|---------|
//! | arena | `ConceptKey` | `get`, `contains`, `resolve` |
//! | by kind | `TypeId` | `find_by_type` |
//! | by reference | `(TypeId, field, target key)` | `find_by_reference` |
//! | SQL objects | lowercase `schema.name` | `find_sql_objects` |
//!
//! Secondary indices are built when a concept becomes visible: immediately on
//! insert, or after its alternative initialization completes. Public queries
//! never return concepts still waiting for initialization.

use std::{
    any::TypeId,
    collections::{HashMap, HashSet}
};

use indexmap::IndexMap;

use crate::{
    concept::{Concept, ConceptKey, ConceptKind, ConceptRef},
    error::AuthoringError,
    sql::SqlObjectKind
};

/// Entry of the SQL object index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlObjectEntry {
    pub key:  ConceptKey,
    pub kind: SqlObjectKind
}

type ReferenceIndexKey = (TypeId, &'static str, ConceptKey);

/// Closed (or growing) set of concepts.
#[derive(Default)]
pub struct ConceptModel {
    concepts:      IndexMap<ConceptKey, Box<dyn Concept>>,
    by_type:       HashMap<TypeId, Vec<ConceptKey>>,
    by_reference:  HashMap<ReferenceIndexKey, Vec<ConceptKey>>,
    sql_objects:   HashMap<String, Vec<SqlObjectEntry>>,
    uninitialized: HashSet<ConceptKey>,
    conflicts:     Vec<AuthoringError>
}

impl std::fmt::Debug for ConceptModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConceptModel")
            .field("concepts", &self.concepts.len())
            .field("uninitialized", &self.uninitialized.len())
            .finish()
    }
}

impl ConceptModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a concept.
    ///
    /// Returns `false` and leaves the model unchanged when the key already
    /// exists. A different kind under an existing key is recorded as a
    /// conflict.
    pub fn insert(&mut self, concept: Box<dyn Concept>) -> bool {
        let key = concept.key();

        if let Some(existing) = self.concepts.get(&key) {
            if existing.as_any().type_id() != concept.as_any().type_id() {
                self.conflicts.push(AuthoringError::new(
                    concept.description(),
                    format!("key {key} is already used by {}", existing.description())
                ));
            }
            return false;
        }

        let pending = concept.is_initializer();
        self.concepts.insert(key.clone(), concept);
        if pending {
            self.uninitialized.insert(key);
        } else {
            self.index(&key);
        }
        true
    }

    /// Visible concept by key.
    #[must_use]
    pub fn get(&self, key: &ConceptKey) -> Option<&dyn Concept> {
        if self.uninitialized.contains(key) {
            return None;
        }
        self.concepts.get(key).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, key: &ConceptKey) -> bool {
        self.get(key).is_some()
    }

    /// Resolve a reference to a concrete kind.
    #[must_use]
    pub fn resolve<T: Concept>(&self, reference: &ConceptRef) -> Option<&T> {
        self.get(reference.key())?.as_any().downcast_ref::<T>()
    }

    /// All visible concepts of kind `T`, in indexing order.
    pub fn find_by_type<T: ConceptKind>(&self) -> Vec<&T> {
        self.by_type
            .get(&TypeId::of::<T>())
            .into_iter()
            .flatten()
            .filter_map(|key| self.concepts.get(key))
            .filter_map(|concept| concept.as_any().downcast_ref::<T>())
            .collect()
    }

    /// Visible concepts of kind `T` whose reference field `field` (Rust field
    /// name) points at `target`.
    pub fn find_by_reference<T: ConceptKind>(
        &self,
        field: &'static str,
        target: &ConceptRef
    ) -> Vec<&T> {
        self.by_reference
            .get(&(TypeId::of::<T>(), field, target.key().clone()))
            .into_iter()
            .flatten()
            .filter_map(|key| self.concepts.get(key))
            .filter_map(|concept| concept.as_any().downcast_ref::<T>())
            .collect()
    }

    /// Concepts producing the database object `schema.name`
    /// (case-insensitive).
    #[must_use]
    pub fn find_sql_objects(&self, schema: &str, name: &str) -> &[SqlObjectEntry] {
        self.sql_objects
            .get(&sql_index_key(schema, name))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of visible concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len() - self.uninitialized.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ConceptKey> {
        self.concepts
            .keys()
            .filter(|key| !self.uninitialized.contains(*key))
    }

    /// Visible concepts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Concept> {
        self.concepts
            .iter()
            .filter(|(key, _)| !self.uninitialized.contains(*key))
            .map(|(_, concept)| concept.as_ref())
    }

    /// Kinds registered under the same key with different types.
    #[must_use]
    pub fn conflicts(&self) -> &[AuthoringError] {
        &self.conflicts
    }

    /// Keys still waiting for initialization, in insertion order.
    pub(crate) fn pending_keys(&self) -> Vec<ConceptKey> {
        self.concepts
            .keys()
            .filter(|key| self.uninitialized.contains(*key))
            .cloned()
            .collect()
    }

    /// Any concept, visible or not.
    pub(crate) fn get_raw(&self, key: &ConceptKey) -> Option<&dyn Concept> {
        self.concepts.get(key).map(AsRef::as_ref)
    }

    /// Store the initialized version of a pending concept and index it.
    pub(crate) fn complete_initialization(&mut self, concept: Box<dyn Concept>) {
        let key = concept.key();
        if !self.uninitialized.remove(&key) {
            return;
        }
        if let Some(slot) = self.concepts.get_mut(&key) {
            *slot = concept;
        }
        self.index(&key);
    }

    fn index(&mut self, key: &ConceptKey) {
        let Some(concept) = self.concepts.get(key) else {
            return;
        };
        let type_id = concept.as_any().type_id();

        self.by_type.entry(type_id).or_default().push(key.clone());

        for reference in concept.references() {
            self.by_reference
                .entry((type_id, reference.field, reference.target.key().clone()))
                .or_default()
                .push(key.clone());
        }

        if let Some(object) = concept.as_sql_object() {
            let object = object.sql_object();
            self.sql_objects
                .entry(sql_index_key(&object.schema, &object.name))
                .or_default()
                .push(SqlObjectEntry {
                    key:  key.clone(),
                    kind: object.kind
                });
        }
    }
}

fn sql_index_key(schema: &str, name: &str) -> String {
    format!("{schema}.{name}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concept::{AlternativeInitialization, Initialization, SqlObjectConcept},
        error::MacroError,
        sql::SqlObject
    };

    #[derive(Debug, Clone, crate::Concept)]
    struct ModuleInfo {
        #[concept(key)]
        name: String
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(keyword = "Table", family = "DataStructure", sql_object)]
    struct TableInfo {
        #[concept(key)]
        module: ConceptRef,
        #[concept(key)]
        name:   String,
        note:   String
    }

    impl SqlObjectConcept for TableInfo {
        fn sql_object(&self) -> SqlObject {
            SqlObject::from_module(&self.module, &self.name, SqlObjectKind::DataStructure)
        }
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(keyword = "View", family = "DataStructure")]
    struct ViewInfo {
        #[concept(key)]
        module: ConceptRef,
        #[concept(key)]
        name:   String
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(initialize)]
    struct LateInfo {
        #[concept(key)]
        module: ConceptRef,
        ready:  bool
    }

    impl AlternativeInitialization for LateInfo {
        fn initialize(&mut self, _model: &ConceptModel) -> Result<Initialization, MacroError> {
            self.ready = true;
            Ok(Initialization::done())
        }
    }

    fn module() -> ConceptRef {
        ConceptRef::from_values("Module", ["Demo"])
    }

    fn table(name: &str, note: &str) -> Box<dyn Concept> {
        Box::new(TableInfo {
            module: module(),
            name:   name.into(),
            note:   note.into()
        })
    }

    #[test]
    fn insert_is_idempotent() {
        let mut model = ConceptModel::new();
        assert!(model.insert(table("Invoice", "first")));
        assert!(!model.insert(table("Invoice", "second")));
        assert_eq!(model.len(), 1);

        let key = ConceptKey::from_raw("DataStructure Demo.Invoice");
        let stored = model.get(&key).unwrap().downcast_ref::<TableInfo>().unwrap();
        assert_eq!(stored.note, "first");
        assert!(model.conflicts().is_empty());
    }

    #[test]
    fn same_key_other_kind_is_a_conflict() {
        let mut model = ConceptModel::new();
        model.insert(table("Invoice", ""));
        let view = ViewInfo {
            module: module(),
            name:   "Invoice".into()
        };
        assert!(!model.insert(Box::new(view)));
        assert_eq!(model.conflicts().len(), 1);
        assert!(model.conflicts()[0].message.contains("Table Demo.Invoice"));
    }

    #[test]
    fn typed_queries() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(ModuleInfo { name: "Demo".into() }));
        model.insert(table("Invoice", ""));
        model.insert(table("Customer", ""));

        let tables = model.find_by_type::<TableInfo>();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "Invoice");

        let in_demo = model.find_by_reference::<TableInfo>("module", &module());
        assert_eq!(in_demo.len(), 2);

        let other = ConceptRef::from_values("Module", ["Other"]);
        assert!(model.find_by_reference::<TableInfo>("module", &other).is_empty());

        assert_eq!(model.resolve::<ModuleInfo>(&module()).unwrap().name, "Demo");
        assert!(model.resolve::<TableInfo>(&module()).is_none());
    }

    #[test]
    fn sql_objects_are_case_insensitive() {
        let mut model = ConceptModel::new();
        model.insert(table("Invoice", ""));

        let found = model.find_sql_objects("DEMO", "invoice");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SqlObjectKind::DataStructure);
        assert!(model.find_sql_objects("Demo", "Missing").is_empty());
    }

    #[test]
    fn uninitialized_concepts_are_hidden() {
        let mut model = ConceptModel::new();
        let late = LateInfo {
            module: module(),
            ready:  false
        };
        let key = late.key();
        model.insert(Box::new(late));

        assert!(!model.contains(&key));
        assert!(model.find_by_type::<LateInfo>().is_empty());
        assert_eq!(model.len(), 0);
        assert_eq!(model.pending_keys(), vec![key.clone()]);

        let mut copy = model.get_raw(&key).unwrap().clone_concept();
        let outcome = copy.as_initializer().unwrap().initialize(&model).unwrap();
        assert!(matches!(outcome, Initialization::Done(ref extra) if extra.is_empty()));
        model.complete_initialization(copy);

        assert!(model.resolve::<LateInfo>(&ConceptRef::new(key)).unwrap().ready);
        assert_eq!(model.find_by_reference::<LateInfo>("module", &module()).len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut model = ConceptModel::new();
        model.insert(table("B", ""));
        model.insert(table("A", ""));
        let keys: Vec<_> = model.keys().map(ConceptKey::as_str).collect();
        assert_eq!(keys, vec!["DataStructure Demo.B", "DataStructure Demo.A"]);
    }
}
