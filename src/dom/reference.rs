// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Foreign keys and cascade deletes of reference properties.

use super::{DELETE_ACTIONS, EntityInfo, PropertyInfo, PropertyType, module_file, object_of, render};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{ConceptRef, ValidatedConcept},
    error::GenerateError,
    model::ConceptModel
};

/// Foreign key of a reference property; created by the property's macro.
#[derive(Debug, Clone, Concept)]
#[concept(keyword = "Reference")]
pub struct ReferenceConstraintInfo {
    #[concept(key)]
    pub property: ConceptRef,

    pub referenced: ConceptRef
}

fn resolve_property<'a>(
    ctx: &GenerationContext<'a>,
    property: &ConceptRef,
    concept: &str
) -> Result<&'a PropertyInfo, GenerateError> {
    ctx.model()
        .resolve::<PropertyInfo>(property)
        .ok_or_else(|| GenerateError::plugin(concept, format!("{property} is not a property")))
}

struct ForeignKey;

impl ForeignKey {
    fn names(
        constraint: &ReferenceConstraintInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<(String, String), GenerateError> {
        let property = resolve_property(ctx, &constraint.property, &constraint.description())?;
        let object = object_of(ctx, &property.data_structure)?;
        let dialect = ctx.dialect();
        let table = dialect.object_name(&object.schema, &object.name);
        let name = dialect.quote_identifier(&format!(
            "FK_{}_{}",
            object.name,
            property.column_name()
        ));
        Ok((table, name))
    }
}

impl DatabaseGenerator<ReferenceConstraintInfo> for ForeignKey {
    fn create_sql(
        &self,
        constraint: &ReferenceConstraintInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let (table, name) = Self::names(constraint, ctx)?;
        let property = resolve_property(ctx, &constraint.property, &constraint.description())?;
        let target = object_of(ctx, &constraint.referenced)?;
        let dialect = ctx.dialect();
        let column = dialect.quote_identifier(&property.column_name());
        let target = dialect.object_name(&target.schema, &target.name);
        render(ctx, &constraint.description(), "AddForeignKey", &[
            ("object", table.as_str()),
            ("constraint", name.as_str()),
            ("column", column.as_str()),
            ("target", target.as_str())
        ])
    }

    fn remove_sql(
        &self,
        constraint: &ReferenceConstraintInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let (table, name) = Self::names(constraint, ctx)?;
        render(ctx, &constraint.description(), "DropConstraint", &[
            ("object", table.as_str()),
            ("constraint", name.as_str())
        ])
    }
}

/// Deleting a referenced row deletes the rows referencing it through
/// `property`.
#[derive(Debug, Clone, Concept)]
#[concept(validate)]
pub struct CascadeDeleteInfo {
    #[concept(key)]
    pub property: ConceptRef
}

impl ValidatedConcept for CascadeDeleteInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        match model.resolve::<PropertyInfo>(&self.property) {
            Some(property) if property.property_type == PropertyType::Reference => Ok(()),
            Some(_) => Err(format!("{} is not a reference property", self.property)),
            None => Err(format!("{} is not a property", self.property))
        }
    }
}

fn generate_cascade(
    cascade: &CascadeDeleteInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    let description = cascade.description();
    let property = resolve_property(ctx, &cascade.property, &description)?;
    let Some(referenced) = &property.referenced else {
        return Err(GenerateError::plugin(description, "property references nothing"));
    };
    let target = ctx
        .model()
        .resolve::<EntityInfo>(referenced)
        .ok_or_else(|| {
            GenerateError::plugin(description.clone(), "referenced data structure is not an entity")
        })?;
    let object = object_of(ctx, &property.data_structure)?;
    let dialect = ctx.dialect();
    let statement = format!(
        "DELETE FROM {} WHERE {} = $1",
        dialect.object_name(&object.schema, &object.name),
        dialect.quote_identifier(&property.column_name())
    );
    let action = format!("            actions.push({statement:?}.to_string());\n");
    ctx.file(&module_file(&target.module))
        .insert(&DELETE_ACTIONS, referenced.key(), action)?;
    Ok(())
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_database::<ReferenceConstraintInfo, _>(ForeignKey)
        .register_generator::<CascadeDeleteInfo, _>(generate_cascade);
}
