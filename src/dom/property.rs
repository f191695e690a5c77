// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Property: a typed field of a data structure.

use super::{
    EntityInfo, PROPERTIES, ReferenceConstraintInfo, field_name, module_file, object_of, render
};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{
        ConceptKey, ConceptRef, KeyFragment, MacroConcept, ValidatedConcept, escape_fragment
    },
    error::{GenerateError, MacroError},
    expand::MacroContext,
    model::ConceptModel
};

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    ShortString,
    LongString,
    Integer,
    Decimal,
    Bool,
    Date,
    /// Foreign key to another data structure.
    Reference
}

impl PropertyType {
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::ShortString | Self::LongString => "String",
            Self::Integer => "Option<i64>",
            Self::Decimal => "Option<f64>",
            Self::Bool => "Option<bool>",
            Self::Date | Self::Reference => "Option<String>"
        }
    }

    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::ShortString => "varchar(256)",
            Self::LongString => "text",
            Self::Integer => "bigint",
            Self::Decimal => "numeric(28, 10)",
            Self::Bool => "boolean",
            Self::Date => "date",
            Self::Reference => "uuid"
        }
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::ShortString | Self::LongString)
    }
}

#[derive(Debug, Clone, Concept)]
#[concept(expand, validate)]
pub struct PropertyInfo {
    #[concept(key)]
    pub data_structure: ConceptRef,

    #[concept(key)]
    pub name: String,

    pub property_type: PropertyType,

    /// Target data structure of a reference property.
    pub referenced: Option<ConceptRef>
}

impl PropertyInfo {
    #[must_use]
    pub fn new(data_structure: &ConceptRef, name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            data_structure: data_structure.clone(),
            name:           name.into(),
            property_type,
            referenced:     None
        }
    }

    /// Reference property pointing at `target`.
    #[must_use]
    pub fn reference_to(data_structure: &ConceptRef, name: impl Into<String>, target: &ConceptRef) -> Self {
        Self {
            data_structure: data_structure.clone(),
            name:           name.into(),
            property_type:  PropertyType::Reference,
            referenced:     Some(target.clone())
        }
    }

    /// Reference to the property `name` of `data_structure`.
    #[must_use]
    pub fn key_for(data_structure: &ConceptRef, name: &str) -> ConceptRef {
        ConceptRef::new(ConceptKey::from_parts(
            "Property",
            &[data_structure.key_fragment(), escape_fragment(name)]
        ))
    }

    #[must_use]
    pub fn reference(&self) -> ConceptRef {
        ConceptRef::new(self.key())
    }

    /// Column name in the database.
    #[must_use]
    pub fn column_name(&self) -> String {
        match self.property_type {
            PropertyType::Reference => format!("{}ID", self.name),
            _ => self.name.clone()
        }
    }
}

impl MacroConcept for PropertyInfo {
    fn create_new_concepts(
        &self,
        _ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        let Some(target) = &self.referenced else {
            return Ok(Vec::new());
        };
        Ok(vec![Box::new(ReferenceConstraintInfo {
            property:   self.reference(),
            referenced: target.clone()
        })])
    }
}

impl ValidatedConcept for PropertyInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        if model.resolve::<EntityInfo>(&self.data_structure).is_none() {
            return Err(format!("{} is not an entity", self.data_structure));
        }
        match (self.property_type, &self.referenced) {
            (PropertyType::Reference, None) => {
                Err("a reference property must name the referenced data structure".into())
            }
            (other, Some(target)) if other != PropertyType::Reference => Err(format!(
                "a {other:?} property cannot reference {target}"
            )),
            _ => Ok(())
        }
    }
}

fn generate(property: &PropertyInfo, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError> {
    let module = ctx
        .model()
        .resolve::<EntityInfo>(&property.data_structure)
        .map(|entity| entity.module.clone())
        .ok_or_else(|| GenerateError::plugin(property.description(), "owner is not an entity"))?;
    let field = format!(
        "        pub {}: {},\n",
        field_name(&property.column_name()),
        property.property_type.rust_type()
    );
    ctx.file(&module_file(&module))
        .insert(&PROPERTIES, property.data_structure.key(), field)?;
    Ok(())
}

struct Column;

impl DatabaseGenerator<PropertyInfo> for Column {
    fn create_sql(
        &self,
        property: &PropertyInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = object_of(ctx, &property.data_structure)?;
        let dialect = ctx.dialect();
        let table = dialect.object_name(&object.schema, &object.name);
        let column = dialect.quote_identifier(&property.column_name());
        render(ctx, &property.description(), "AddColumn", &[
            ("object", table.as_str()),
            ("column", column.as_str()),
            ("type", property.property_type.sql_type())
        ])
    }

    fn remove_sql(
        &self,
        property: &PropertyInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = object_of(ctx, &property.data_structure)?;
        let dialect = ctx.dialect();
        let table = dialect.object_name(&object.schema, &object.name);
        let column = dialect.quote_identifier(&property.column_name());
        render(ctx, &property.description(), "DropColumn", &[
            ("object", table.as_str()),
            ("column", column.as_str())
        ])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<PropertyInfo, _>(generate)
        .register_database::<PropertyInfo, _>(Column);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> ConceptRef {
        ConceptRef::from_values("DataStructure", ["Demo", "Invoice"])
    }

    #[test]
    fn key_includes_data_structure() {
        let property = PropertyInfo::new(&invoice(), "Due date", PropertyType::Date);
        assert_eq!(property.key().as_str(), "Property Demo.Invoice.'Due date'");
        assert_eq!(PropertyInfo::key_for(&invoice(), "Due date"), property.reference());
    }

    #[test]
    fn reference_property_expands_to_constraint() {
        let customer = ConceptRef::from_values("DataStructure", ["Demo", "Customer"]);
        let property = PropertyInfo::reference_to(&invoice(), "Customer", &customer);
        let model = ConceptModel::new();
        let mut cache = crate::sql::SqlObjectCache::new();
        let mut ctx = MacroContext::new(&model, &mut cache);

        let created = property.create_new_concepts(&mut ctx).unwrap();
        assert_eq!(created.len(), 1);
        let constraint = created[0].downcast_ref::<ReferenceConstraintInfo>().unwrap();
        assert_eq!(constraint.referenced, customer);
        assert_eq!(property.column_name(), "CustomerID");
    }

    #[test]
    fn reference_consistency_is_validated() {
        let mut model = ConceptModel::new();
        let demo = ConceptRef::from_values("Module", ["Demo"]);
        model.insert(Box::new(EntityInfo::new(&demo, "Invoice")));

        let mut dangling = PropertyInfo::new(&invoice(), "Customer", PropertyType::Reference);
        assert!(dangling.check_semantics(&model).is_err());

        dangling.property_type = PropertyType::Integer;
        dangling.referenced = Some(invoice());
        let message = dangling.check_semantics(&model).unwrap_err();
        assert!(message.contains("Integer"));

        let plain = PropertyInfo::new(&invoice(), "Code", PropertyType::ShortString);
        assert!(plain.check_semantics(&model).is_ok());
    }

    #[test]
    fn owner_must_be_an_entity() {
        let model = ConceptModel::new();
        let plain = PropertyInfo::new(&invoice(), "Code", PropertyType::ShortString);
        let message = plain.check_semantics(&model).unwrap_err();
        assert!(message.contains("is not an entity"));
    }
}
