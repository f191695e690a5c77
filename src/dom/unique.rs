// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Unique index over several properties.
//!
//! The key names the properties as written (`"Group Code"`); the property
//! references are filled in by initialization once every named property
//! exists.

use super::{PropertyInfo, object_of, render};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{AlternativeInitialization, ConceptRef, Initialization},
    error::{GenerateError, MacroError},
    model::ConceptModel
};

#[derive(Debug, Clone, Concept)]
#[concept(initialize)]
pub struct UniqueMultipleInfo {
    #[concept(key)]
    pub data_structure: ConceptRef,

    /// Space-separated property names.
    #[concept(key)]
    pub property_names: String,

    /// Resolved properties, in `property_names` order.
    pub properties: Vec<ConceptRef>
}

impl UniqueMultipleInfo {
    #[must_use]
    pub fn new(data_structure: &ConceptRef, property_names: impl Into<String>) -> Self {
        Self {
            data_structure: data_structure.clone(),
            property_names: property_names.into(),
            properties:     Vec::new()
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.property_names.split_whitespace()
    }
}

impl AlternativeInitialization for UniqueMultipleInfo {
    fn initialize(&mut self, model: &ConceptModel) -> Result<Initialization, MacroError> {
        if self.names().next().is_none() {
            return Err(MacroError::new(self.description(), "no property names given"));
        }

        let mut properties = Vec::new();
        for name in self.names() {
            let property = PropertyInfo::key_for(&self.data_structure, name);
            if model.resolve::<PropertyInfo>(&property).is_none() {
                return Ok(Initialization::Pending(format!("property {property} does not exist")));
            }
            properties.push(property);
        }

        self.properties = properties;
        Ok(Initialization::done())
    }
}

struct UniqueIndex;

impl UniqueIndex {
    fn index_name(unique: &UniqueMultipleInfo, table: &str) -> String {
        format!("IX_{}_{}", table, unique.names().collect::<Vec<_>>().join("_"))
    }
}

impl DatabaseGenerator<UniqueMultipleInfo> for UniqueIndex {
    fn create_sql(
        &self,
        unique: &UniqueMultipleInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = object_of(ctx, &unique.data_structure)?;
        let dialect = ctx.dialect();
        let mut columns = Vec::with_capacity(unique.properties.len());
        for reference in &unique.properties {
            let property = ctx.model().resolve::<PropertyInfo>(reference).ok_or_else(|| {
                GenerateError::plugin(unique.description(), format!("{reference} is not a property"))
            })?;
            columns.push(dialect.quote_identifier(&property.column_name()));
        }
        let table = dialect.object_name(&object.schema, &object.name);
        let index = dialect.quote_identifier(&Self::index_name(unique, &object.name));
        let columns = columns.join(", ");
        render(ctx, &unique.description(), "CreateUniqueIndex", &[
            ("object", table.as_str()),
            ("index", index.as_str()),
            ("columns", columns.as_str())
        ])
    }

    fn remove_sql(
        &self,
        unique: &UniqueMultipleInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = object_of(ctx, &unique.data_structure)?;
        let dialect = ctx.dialect();
        let schema = dialect.quote_identifier(&object.schema);
        let index = dialect.quote_identifier(&Self::index_name(unique, &object.name));
        render(ctx, &unique.description(), "DropIndex", &[
            ("schema", schema.as_str()),
            ("index", index.as_str())
        ])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry.register_database::<UniqueMultipleInfo, _>(UniqueIndex);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PropertyType;

    fn invoice() -> ConceptRef {
        ConceptRef::from_values("DataStructure", ["Demo", "Invoice"])
    }

    #[test]
    fn waits_for_every_property() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(PropertyInfo::new(&invoice(), "Code", PropertyType::ShortString)));

        let mut unique = UniqueMultipleInfo::new(&invoice(), "Group Code");
        let outcome = unique.initialize(&model).unwrap();
        assert!(matches!(outcome, Initialization::Pending(ref reason) if reason.contains("Group")));
        assert!(unique.properties.is_empty());

        model.insert(Box::new(PropertyInfo::new(&invoice(), "Group", PropertyType::Integer)));
        let outcome = unique.initialize(&model).unwrap();
        assert!(matches!(outcome, Initialization::Done(_)));
        assert_eq!(unique.properties, vec![
            PropertyInfo::key_for(&invoice(), "Group"),
            PropertyInfo::key_for(&invoice(), "Code"),
        ]);
    }

    #[test]
    fn empty_name_list_fails() {
        let mut unique = UniqueMultipleInfo::new(&invoice(), " ");
        assert!(unique.initialize(&ConceptModel::new()).is_err());
    }

    #[test]
    fn key_keeps_names_verbatim() {
        let unique = UniqueMultipleInfo::new(&invoice(), "Group Code");
        assert_eq!(unique.key().as_str(), "UniqueMultiple Demo.Invoice.'Group Code'");
    }
}
