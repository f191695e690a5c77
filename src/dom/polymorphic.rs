// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Polymorphic data structures: a union view over their subtypes.
//!
//! ```text
//! CREATE VIEW "Demo"."Document" AS
//! /*#Subtypes DataStructure Demo.Document#*/    ← one SELECT per IsSubtypeOf
//! ```

use super::{object_of, render, schema_of};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{ConceptRef, MacroConcept, SqlObjectConcept, ValidatedConcept},
    error::{GenerateError, MacroError},
    expand::MacroContext,
    model::ConceptModel,
    sql::{SqlDependsOnDataStructureInfo, SqlObject, SqlObjectKind},
    template::Tag
};

/// Subtype selects of a union view, resolved in the shared SQL builder.
pub const SUBTYPES: Tag = Tag::list("Subtypes", "\nUNION ALL\n");

#[derive(Debug, Clone, Concept)]
#[concept(keyword = "Polymorphic", family = "DataStructure", sql_object, validate)]
pub struct PolymorphicInfo {
    #[concept(key)]
    pub module: ConceptRef,

    #[concept(key)]
    pub name: String
}

#[derive(Debug, Clone, Concept)]
#[concept(expand, validate)]
pub struct IsSubtypeOfInfo {
    #[concept(key)]
    pub subtype: ConceptRef,

    #[concept(key)]
    pub supertype: ConceptRef
}

impl PolymorphicInfo {
    #[must_use]
    pub fn new(module: &ConceptRef, name: impl Into<String>) -> Self {
        Self {
            module: module.clone(),
            name:   name.into()
        }
    }

    #[must_use]
    pub fn reference(&self) -> ConceptRef {
        ConceptRef::new(self.key())
    }
}

impl IsSubtypeOfInfo {
    #[must_use]
    pub fn new(subtype: &ConceptRef, supertype: &ConceptRef) -> Self {
        Self {
            subtype:   subtype.clone(),
            supertype: supertype.clone()
        }
    }
}

impl SqlObjectConcept for PolymorphicInfo {
    fn sql_object(&self) -> SqlObject {
        SqlObject::from_module(&self.module, &self.name, SqlObjectKind::PolymorphicUnionView)
    }
}

impl ValidatedConcept for PolymorphicInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        if model
            .find_by_reference::<IsSubtypeOfInfo>("supertype", &self.reference())
            .is_empty()
        {
            return Err("a polymorphic data structure needs at least one subtype".into());
        }
        Ok(())
    }
}

impl MacroConcept for IsSubtypeOfInfo {
    fn create_new_concepts(
        &self,
        _ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        Ok(vec![Box::new(SqlDependsOnDataStructureInfo::new(
            self.supertype.clone(),
            self.subtype.clone()
        ))])
    }
}

impl ValidatedConcept for IsSubtypeOfInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        if model.resolve::<PolymorphicInfo>(&self.supertype).is_none() {
            return Err(format!("{} is not polymorphic", self.supertype));
        }
        let visible = model
            .get(self.subtype.key())
            .is_some_and(|subtype| subtype.as_sql_object().is_some());
        if !visible {
            return Err(format!("{} is not a database-visible data structure", self.subtype));
        }
        Ok(())
    }
}

fn generate_subtype(
    subtype_of: &IsSubtypeOfInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    let object = object_of(ctx, &subtype_of.subtype)?;
    let dialect = ctx.dialect();
    let select = format!(
        "SELECT {id}, '{name}' AS {subtype} FROM {table}",
        id = dialect.quote_identifier("ID"),
        name = object.name.replace('\'', "''"),
        subtype = dialect.quote_identifier("Subtype"),
        table = dialect.object_name(&object.schema, &object.name)
    );
    ctx.sql()
        .insert(&SUBTYPES, subtype_of.supertype.key(), select)?;
    Ok(())
}

struct UnionView;

impl DatabaseGenerator<PolymorphicInfo> for UnionView {
    fn create_sql(
        &self,
        polymorphic: &PolymorphicInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&polymorphic.module), &polymorphic.name);
        let body = SUBTYPES.marker(&polymorphic.key());
        render(ctx, &polymorphic.description(), "CreateView", &[
            ("object", object.as_str()),
            ("body", body.as_str())
        ])
    }

    fn remove_sql(
        &self,
        polymorphic: &PolymorphicInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&polymorphic.module), &polymorphic.name);
        render(ctx, &polymorphic.description(), "DropView", &[("object", object.as_str())])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<IsSubtypeOfInfo, _>(generate_subtype)
        .register_database::<PolymorphicInfo, _>(UnionView);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{concept::DependencyConcept, dom::EntityInfo, sql::SqlObjectCache};

    fn demo() -> ConceptRef {
        ConceptRef::from_values("Module", ["Demo"])
    }

    #[test]
    fn shares_data_structure_family() {
        let document = PolymorphicInfo::new(&demo(), "Document");
        let invoice = EntityInfo::new(&demo(), "Invoice");
        assert_eq!(document.key().family(), invoice.key().family());
        assert_eq!(document.description(), "Polymorphic Demo.Document");
    }

    #[test]
    fn union_view_depends_on_subtype() {
        let document = PolymorphicInfo::new(&demo(), "Document").reference();
        let invoice = EntityInfo::new(&demo(), "Invoice").reference();
        let model = ConceptModel::new();
        let mut cache = SqlObjectCache::new();
        let mut ctx = MacroContext::new(&model, &mut cache);

        let created = IsSubtypeOfInfo::new(&invoice, &document)
            .create_new_concepts(&mut ctx)
            .unwrap();
        let dependency = created[0].as_dependency().unwrap();
        assert_eq!(dependency.dependent(), &document);
        assert_eq!(dependency.depends_on(), &invoice);
    }

    #[test]
    fn polymorphic_requires_a_subtype() {
        let mut model = ConceptModel::new();
        let document = PolymorphicInfo::new(&demo(), "Document");
        model.insert(Box::new(document.clone()));
        assert!(document.check_semantics(&model).is_err());

        let invoice = EntityInfo::new(&demo(), "Invoice");
        let subtype = IsSubtypeOfInfo::new(&invoice.reference(), &document.reference());
        model.insert(Box::new(invoice));
        model.insert(Box::new(subtype.clone()));
        assert!(document.check_semantics(&model).is_ok());
        assert!(subtype.check_semantics(&model).is_ok());
    }
}
