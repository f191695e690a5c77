// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Automatic numbering of a code property.
//!
//! Each kind expands into a unique index over the numbered property (and the
//! group property) and generates a `BEFORE INSERT` trigger. Text properties
//! follow the prefixed policy, integer properties the integer policy; see
//! [`crate::auto_code`] for the numbering rules. Any other property type
//! yields a [`ConceptErrorInfo`].

use super::{
    BEFORE_SAVE, ConceptErrorInfo, EntityInfo, PropertyInfo, PropertyType, UniqueMultipleInfo,
    field_name, module_file, object_of
};
use crate::{
    Concept,
    auto_code::{IntegerCodePolicy, PrefixedCodePolicy},
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{ConceptRef, MacroConcept, ValidatedConcept},
    error::{GenerateError, MacroError},
    expand::MacroContext,
    model::ConceptModel
};

/// Numbering over the whole table.
#[derive(Debug, Clone, Concept)]
#[concept(expand, validate)]
pub struct AutoCodeInfo {
    #[concept(key)]
    pub property: ConceptRef
}

/// Numbering restarting for each value of `group`.
#[derive(Debug, Clone, Concept)]
#[concept(expand, validate)]
pub struct AutoCodeForEachInfo {
    #[concept(key)]
    pub property: ConceptRef,

    pub group: ConceptRef
}

fn supported(property_type: PropertyType) -> bool {
    property_type.is_text() || property_type == PropertyType::Integer
}

/// Unique index or error concept for `owner`.
fn expand(
    owner: &dyn Concept,
    property: &ConceptRef,
    group: Option<&ConceptRef>,
    model: &ConceptModel
) -> Vec<Box<dyn Concept>> {
    let Some(numbered) = model.resolve::<PropertyInfo>(property) else {
        return Vec::new();
    };

    if !supported(numbered.property_type) {
        return vec![Box::new(ConceptErrorInfo {
            origin:  ConceptRef::new(owner.key()),
            message: format!(
                "automatic numbering is not supported for {:?} properties",
                numbered.property_type
            )
        })];
    }

    let names = match group.and_then(|group| model.resolve::<PropertyInfo>(group)) {
        Some(grouping) => format!("{} {}", grouping.name, numbered.name),
        None if group.is_some() => return Vec::new(),
        None => numbered.name.clone()
    };
    vec![Box::new(UniqueMultipleInfo::new(&numbered.data_structure, names))]
}

fn check(
    property: &ConceptRef,
    group: Option<&ConceptRef>,
    model: &ConceptModel
) -> Result<(), String> {
    let numbered = model
        .resolve::<PropertyInfo>(property)
        .ok_or_else(|| format!("{property} is not a property"))?;
    if let Some(group) = group {
        let grouping = model
            .resolve::<PropertyInfo>(group)
            .ok_or_else(|| format!("{group} is not a property"))?;
        if grouping.data_structure != numbered.data_structure {
            return Err(format!(
                "group {group} belongs to another data structure than {property}"
            ));
        }
    }
    Ok(())
}

impl MacroConcept for AutoCodeInfo {
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        Ok(expand(self, &self.property, None, ctx.model()))
    }
}

impl ValidatedConcept for AutoCodeInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        check(&self.property, None, model)
    }
}

impl MacroConcept for AutoCodeForEachInfo {
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        Ok(expand(self, &self.property, Some(&self.group), ctx.model()))
    }
}

impl ValidatedConcept for AutoCodeForEachInfo {
    fn check_semantics(&self, model: &ConceptModel) -> Result<(), String> {
        check(&self.property, Some(&self.group), model)
    }
}

/// Names shared by the source and database generators.
struct Numbering<'a> {
    numbered: &'a PropertyInfo,
    grouping: Option<&'a PropertyInfo>,
    entity:   &'a EntityInfo
}

impl<'a> Numbering<'a> {
    fn resolve(
        ctx: &GenerationContext<'a>,
        concept: &dyn Concept,
        property: &ConceptRef,
        group: Option<&ConceptRef>
    ) -> Result<Self, GenerateError> {
        let model = ctx.model();
        let missing = |what: &ConceptRef| {
            GenerateError::plugin(concept.description(), format!("{what} cannot be resolved"))
        };
        let numbered = model
            .resolve::<PropertyInfo>(property)
            .ok_or_else(|| missing(property))?;
        let grouping = match group {
            Some(group) => Some(
                model
                    .resolve::<PropertyInfo>(group)
                    .ok_or_else(|| missing(group))?
            ),
            None => None
        };
        let entity = model
            .resolve::<EntityInfo>(&numbered.data_structure)
            .ok_or_else(|| missing(&numbered.data_structure))?;
        Ok(Self {
            numbered,
            grouping,
            entity
        })
    }

    fn trigger_name(&self) -> String {
        format!("{}_AutoCode_{}", self.entity.name, self.numbered.name)
    }

    /// Client-side preparation: an empty text code requests a number.
    fn before_save(&self) -> Option<String> {
        self.numbered.property_type.is_text().then(|| {
            let field = field_name(&self.numbered.column_name());
            format!(
                "            if self.{field}.is_empty() {{\n                self.{field} = \"+\".to_string();\n            }}\n"
            )
        })
    }

    fn create_sql(&self, ctx: &GenerationContext<'_>) -> Result<String, GenerateError> {
        let dialect = ctx.dialect();
        let object = object_of(ctx, &self.numbered.data_structure)?;
        let table = dialect.object_name(&object.schema, &object.name);
        let function = dialect.object_name(&object.schema, &self.trigger_name());
        let column = dialect.quote_identifier(&self.numbered.column_name());
        let entity = self.entity.key();
        let resource = [entity.values(), self.numbered.name.as_str()];
        let group_column = self
            .grouping
            .map(|grouping| dialect.quote_identifier(&grouping.column_name()));
        let lock = match &group_column {
            Some(group_column) => {
                dialect.lock_resource_for(&resource, &format!("NEW.{group_column}"))
            }
            None => dialect.lock_resource(&resource)
        };
        let group_condition = group_column
            .map(|group_column| format!("{group_column} = NEW.{group_column}"));

        let assignment = if self.numbered.property_type.is_text() {
            let filter = group_condition
                .map(|condition| PrefixedCodePolicy.grouping_filter(&condition))
                .unwrap_or_default();
            format!(
                "    IF NEW.{column} IS NULL OR NEW.{column} = '' OR NEW.{column} LIKE '%+' THEN\n        {lock}\n        request := COALESCE(NULLIF(NEW.{column}, ''), '+');\n        prefix := rtrim(rtrim(request, '+'), '#');\n        digits := length(request) - length(prefix);\n        SELECT COALESCE(MAX(substring({column} FROM length(prefix) + 1)::bigint), 0) + 1\n            INTO counter\n            FROM {table}\n            WHERE left({column}, length(prefix)) = prefix AND substring({column} FROM length(prefix) + 1) ~ '^[0-9]+$'{filter};\n        NEW.{column} := prefix || lpad(counter::text, GREATEST(digits, length(counter::text)), '0');\n    END IF;\n"
            )
        } else {
            let filter = group_condition
                .map(|condition| IntegerCodePolicy.grouping_filter(&condition))
                .unwrap_or_default();
            format!(
                "    IF NEW.{column} IS NULL THEN\n        {lock}\n        SELECT COALESCE(MAX({column}), 0) + 1 INTO NEW.{column} FROM {table}{filter};\n    END IF;\n"
            )
        };

        let trigger = dialect.quote_identifier(&self.trigger_name());
        Ok(format!(
            "CREATE FUNCTION {function}() RETURNS trigger AS $$\nDECLARE\n    request text;\n    prefix text;\n    digits integer;\n    counter bigint;\nBEGIN\n{assignment}    RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;\n\nCREATE TRIGGER {trigger} BEFORE INSERT ON {table} FOR EACH ROW EXECUTE FUNCTION {function}();"
        ))
    }

    fn remove_sql(&self, ctx: &GenerationContext<'_>) -> Result<String, GenerateError> {
        let dialect = ctx.dialect();
        let object = object_of(ctx, &self.numbered.data_structure)?;
        let table = dialect.object_name(&object.schema, &object.name);
        let function = dialect.object_name(&object.schema, &self.trigger_name());
        let trigger = dialect.quote_identifier(&self.trigger_name());
        Ok(format!(
            "DROP TRIGGER {trigger} ON {table};\nDROP FUNCTION {function}();"
        ))
    }

    fn generate(&self, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError> {
        if let Some(code) = self.before_save() {
            ctx.file(&module_file(&self.entity.module))
                .insert(&BEFORE_SAVE, &self.entity.key(), code)?;
        }
        Ok(())
    }
}

fn generate_auto_code(
    auto_code: &AutoCodeInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    Numbering::resolve(ctx, auto_code, &auto_code.property, None)?.generate(ctx)
}

fn generate_auto_code_for_each(
    auto_code: &AutoCodeForEachInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    Numbering::resolve(ctx, auto_code, &auto_code.property, Some(&auto_code.group))?.generate(ctx)
}

struct Trigger;

impl DatabaseGenerator<AutoCodeInfo> for Trigger {
    fn create_sql(
        &self,
        auto_code: &AutoCodeInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        Numbering::resolve(ctx, auto_code, &auto_code.property, None)?.create_sql(ctx)
    }

    fn remove_sql(
        &self,
        auto_code: &AutoCodeInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        Numbering::resolve(ctx, auto_code, &auto_code.property, None)?.remove_sql(ctx)
    }
}

impl DatabaseGenerator<AutoCodeForEachInfo> for Trigger {
    fn create_sql(
        &self,
        auto_code: &AutoCodeForEachInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        Numbering::resolve(ctx, auto_code, &auto_code.property, Some(&auto_code.group))?
            .create_sql(ctx)
    }

    fn remove_sql(
        &self,
        auto_code: &AutoCodeForEachInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        Numbering::resolve(ctx, auto_code, &auto_code.property, Some(&auto_code.group))?
            .remove_sql(ctx)
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<AutoCodeInfo, _>(generate_auto_code)
        .register_generator::<AutoCodeForEachInfo, _>(generate_auto_code_for_each)
        .register_database::<AutoCodeInfo, _>(Trigger)
        .register_database::<AutoCodeForEachInfo, _>(Trigger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlObjectCache;

    fn invoice() -> ConceptRef {
        ConceptRef::from_values("DataStructure", ["Demo", "Invoice"])
    }

    fn model_with(name: &str, property_type: PropertyType) -> ConceptModel {
        let mut model = ConceptModel::new();
        model.insert(Box::new(PropertyInfo::new(&invoice(), name, property_type)));
        model
    }

    fn run(concept: &dyn MacroConcept, model: &ConceptModel) -> Vec<Box<dyn Concept>> {
        let mut cache = SqlObjectCache::new();
        let mut ctx = MacroContext::new(model, &mut cache);
        concept.create_new_concepts(&mut ctx).unwrap()
    }

    #[test]
    fn text_property_gets_unique_index() {
        let model = model_with("Code", PropertyType::ShortString);
        let auto_code = AutoCodeInfo {
            property: PropertyInfo::key_for(&invoice(), "Code")
        };

        let created = run(&auto_code, &model);
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].key().as_str(),
            "UniqueMultiple Demo.Invoice.Code"
        );
    }

    #[test]
    fn unsupported_type_becomes_error_concept() {
        let model = model_with("Paid", PropertyType::Bool);
        let auto_code = AutoCodeInfo {
            property: PropertyInfo::key_for(&invoice(), "Paid")
        };

        let created = run(&auto_code, &model);
        let error = created[0].as_error().unwrap();
        assert!(error.error_message().contains("Bool"));
    }

    #[test]
    fn missing_property_delays_expansion() {
        let auto_code = AutoCodeInfo {
            property: PropertyInfo::key_for(&invoice(), "Code")
        };
        assert!(run(&auto_code, &ConceptModel::new()).is_empty());
    }

    #[test]
    fn grouped_numbering_indexes_group_first() {
        let mut model = model_with("Code", PropertyType::ShortString);
        model.insert(Box::new(PropertyInfo::new(&invoice(), "Year", PropertyType::Integer)));
        let auto_code = AutoCodeForEachInfo {
            property: PropertyInfo::key_for(&invoice(), "Code"),
            group:    PropertyInfo::key_for(&invoice(), "Year")
        };

        let created = run(&auto_code, &model);
        assert_eq!(
            created[0].key().as_str(),
            "UniqueMultiple Demo.Invoice.'Year Code'"
        );
        assert!(auto_code.check_semantics(&model).is_ok());
    }
}
