// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dependency concepts derived from SQL text.

use tracing::debug;

use super::{SqlObjectCache, SqlObjectKind};
use crate::{
    Concept,
    concept::{ConceptRef, DependencyConcept},
    model::ConceptModel
};

/// Hand-written dependency; the escape hatch for references the SQL scan
/// cannot see.
#[derive(Debug, Clone, Concept)]
#[concept(dependency)]
pub struct SqlDependsOnInfo {
    #[concept(key)]
    pub dependent: ConceptRef,

    #[concept(key)]
    pub depends_on: ConceptRef
}

/// SQL of `dependent` reads a data structure (table or polymorphic union
/// view).
#[derive(Debug, Clone, Concept)]
#[concept(dependency)]
pub struct SqlDependsOnDataStructureInfo {
    #[concept(key)]
    pub dependent: ConceptRef,

    #[concept(key)]
    pub depends_on: ConceptRef
}

/// SQL of `dependent` reads a view.
#[derive(Debug, Clone, Concept)]
#[concept(dependency)]
pub struct SqlDependsOnSqlViewInfo {
    #[concept(key)]
    pub dependent: ConceptRef,

    #[concept(key)]
    pub depends_on: ConceptRef
}

/// SQL of `dependent` calls a function.
#[derive(Debug, Clone, Concept)]
#[concept(dependency)]
pub struct SqlDependsOnSqlFunctionInfo {
    #[concept(key)]
    pub dependent: ConceptRef,

    #[concept(key)]
    pub depends_on: ConceptRef
}

macro_rules! dependency_concept {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                #[must_use]
                pub fn new(dependent: ConceptRef, depends_on: ConceptRef) -> Self {
                    Self {
                        dependent,
                        depends_on
                    }
                }
            }

            impl DependencyConcept for $ty {
                fn dependent(&self) -> &ConceptRef {
                    &self.dependent
                }

                fn depends_on(&self) -> &ConceptRef {
                    &self.depends_on
                }
            }
        )*
    };
}

dependency_concept!(
    SqlDependsOnInfo,
    SqlDependsOnDataStructureInfo,
    SqlDependsOnSqlViewInfo,
    SqlDependsOnSqlFunctionInfo
);

/// Dependency concepts for every known object `sql` references.
///
/// Objects produced by `dependent` itself are skipped; unknown names are
/// ignored.
pub fn sql_dependencies(
    dependent: &ConceptRef,
    sql: &str,
    model: &ConceptModel,
    cache: &mut SqlObjectCache
) -> Vec<Box<dyn Concept>> {
    let objects = cache.objects(sql);
    let mut created: Vec<Box<dyn Concept>> = Vec::new();

    for object in objects.iter() {
        for entry in model.find_sql_objects(&object.schema, &object.name) {
            if &entry.key == dependent.key() {
                continue;
            }
            let depends_on = ConceptRef::new(entry.key.clone());
            let dependent = dependent.clone();
            match entry.kind {
                SqlObjectKind::DataStructure | SqlObjectKind::PolymorphicUnionView => {
                    created.push(Box::new(SqlDependsOnDataStructureInfo::new(
                        dependent, depends_on
                    )));
                }
                SqlObjectKind::SqlView => {
                    created.push(Box::new(SqlDependsOnSqlViewInfo::new(dependent, depends_on)));
                }
                SqlObjectKind::SqlFunction => {
                    created.push(Box::new(SqlDependsOnSqlFunctionInfo::new(dependent, depends_on)));
                }
            }
        }
    }

    debug!(
        dependent = %dependent,
        objects = objects.len(),
        edges = created.len(),
        "inferred SQL dependencies"
    );
    created
}
