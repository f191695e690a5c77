// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Change logging of an entity.
//!
//! `Logging` expands into one `LogProperty` per property of the entity, so
//! properties added by other macros are picked up in later passes. The
//! entity's `after_save` collects the logged pairs through the
//! [`LOGGED_PROPERTIES`] list tag owned by the `Logging` concept.

use super::{AFTER_SAVE, EntityInfo, PropertyInfo, field_name, module_file};
use crate::{
    Concept,
    codegen::{GenerationContext, PluginRegistry},
    concept::{ConceptRef, MacroConcept},
    error::{GenerateError, MacroError},
    expand::MacroContext,
    model::ConceptModel,
    order::Dependency,
    template::Tag
};

/// `("Name", value)` pairs logged after save.
pub const LOGGED_PROPERTIES: Tag = Tag::list("LoggedProperties", ", ");

#[derive(Debug, Clone, Concept)]
#[concept(expand)]
pub struct LoggingInfo {
    #[concept(key)]
    pub entity: ConceptRef
}

#[derive(Debug, Clone, Concept)]
pub struct LogPropertyInfo {
    #[concept(key)]
    pub logging: ConceptRef,

    #[concept(key)]
    pub property: ConceptRef
}

impl LoggingInfo {
    #[must_use]
    pub fn new(entity: &ConceptRef) -> Self {
        Self {
            entity: entity.clone()
        }
    }

    #[must_use]
    pub fn reference(&self) -> ConceptRef {
        ConceptRef::new(self.key())
    }
}

impl MacroConcept for LoggingInfo {
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        let logging = self.reference();
        Ok(ctx
            .model()
            .find_by_reference::<PropertyInfo>("data_structure", &self.entity)
            .into_iter()
            .map(|property| -> Box<dyn Concept> {
                Box::new(LogPropertyInfo {
                    logging:  logging.clone(),
                    property: property.reference()
                })
            })
            .collect())
    }
}

/// The log is built after every logged property exists in the struct.
fn logged_properties(logging: &LoggingInfo, model: &ConceptModel) -> Vec<Dependency> {
    let properties: Vec<ConceptRef> = model
        .find_by_reference::<PropertyInfo>("data_structure", &logging.entity)
        .into_iter()
        .map(PropertyInfo::reference)
        .collect();
    Dependency::bulk(&logging.reference(), &properties)
}

fn entity_of<'a>(
    ctx: &GenerationContext<'a>,
    entity: &ConceptRef,
    concept: &dyn Concept
) -> Result<&'a EntityInfo, GenerateError> {
    ctx.model()
        .resolve::<EntityInfo>(entity)
        .ok_or_else(|| {
            GenerateError::plugin(concept.description(), format!("{entity} is not an entity"))
        })
}

fn generate_logging(
    logging: &LoggingInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    let entity = entity_of(ctx, &logging.entity, logging)?;
    let code = format!(
        "            let logged: Vec<(&'static str, String)> = vec![{}];\n            log.extend(logged);\n",
        LOGGED_PROPERTIES.marker(&logging.key())
    );
    ctx.file(&module_file(&entity.module))
        .insert(&AFTER_SAVE, &entity.key(), code)?;
    Ok(())
}

fn generate_log_property(
    log_property: &LogPropertyInfo,
    ctx: &mut GenerationContext<'_>
) -> Result<(), GenerateError> {
    let model = ctx.model();
    let missing = |what: &ConceptRef| {
        GenerateError::plugin(log_property.description(), format!("{what} cannot be resolved"))
    };
    let logging = model
        .resolve::<LoggingInfo>(&log_property.logging)
        .ok_or_else(|| missing(&log_property.logging))?;
    let property = model
        .resolve::<PropertyInfo>(&log_property.property)
        .ok_or_else(|| missing(&log_property.property))?;
    let entity = entity_of(ctx, &logging.entity, log_property)?;

    let pair = format!(
        "(\"{}\", format!(\"{{:?}}\", self.{}))",
        property.name,
        field_name(&property.column_name())
    );
    ctx.file(&module_file(&entity.module))
        .insert(&LOGGED_PROPERTIES, &logging.key(), pair)?;
    Ok(())
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<LoggingInfo, _>(generate_logging)
        .register_generator::<LogPropertyInfo, _>(generate_log_property)
        .register_extender::<LoggingInfo, _>(logged_properties);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dom::PropertyType, sql::SqlObjectCache};

    fn invoice() -> ConceptRef {
        ConceptRef::from_values("DataStructure", ["Demo", "Invoice"])
    }

    fn model() -> ConceptModel {
        let mut model = ConceptModel::new();
        for name in ["Code", "Total"] {
            model.insert(Box::new(PropertyInfo::new(&invoice(), name, PropertyType::ShortString)));
        }
        model
    }

    #[test]
    fn logs_every_property_of_the_entity() {
        let model = model();
        let logging = LoggingInfo::new(&invoice());
        let mut cache = SqlObjectCache::new();
        let mut ctx = MacroContext::new(&model, &mut cache);

        let created = logging.create_new_concepts(&mut ctx).unwrap();
        let keys: Vec<String> = created.iter().map(|c| c.key().to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "LogProperty Demo.Invoice.Demo.Invoice.Code",
                "LogProperty Demo.Invoice.Demo.Invoice.Total",
            ]
        );
    }

    #[test]
    fn logging_depends_on_logged_properties() {
        let model = model();
        let logging = LoggingInfo::new(&invoice());

        let edges = logged_properties(&logging, &model);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|edge| edge.dependent == logging.key()));
    }
}
