// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity: a table and the struct mapping its rows.
//!
//! # Generated struct
//!
//! ```text
//! pub struct <Name> {
//!     pub id: String,
//!     /*#Properties#*/              ← PropertyInfo
//! }
//!
//! impl <Name> {
//!     before_save  /*#BeforeSave#*/     ← AutoCodeInfo
//!     after_save   /*#AfterSave#*/      ← LoggingInfo
//!     delete_actions /*#DeleteActions#*/ ← CascadeDeleteInfo on referencing properties
//! }
//! ```

use super::{AFTER_SAVE, BEFORE_SAVE, DELETE_ACTIONS, MEMBERS, PROPERTIES, render, schema_of};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{ConceptRef, SqlObjectConcept},
    error::GenerateError,
    sql::{SqlObject, SqlObjectKind}
};

#[derive(Debug, Clone, Concept)]
#[concept(keyword = "Entity", family = "DataStructure", sql_object)]
pub struct EntityInfo {
    #[concept(key)]
    pub module: ConceptRef,

    #[concept(key)]
    pub name: String
}

impl EntityInfo {
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

impl SqlObjectConcept for EntityInfo {
    fn sql_object(&self) -> SqlObject {
        SqlObject::from_module(&self.module, &self.name, SqlObjectKind::DataStructure)
    }
}

fn generate(entity: &EntityInfo, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError> {
    let key = entity.key();
    let code = format!(
        "
    /// {description}.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct {name} {{
        pub id: String,
{properties}    }}

    impl {name} {{
        pub const TABLE: &'static str = \"{schema}.{name}\";

        pub fn before_save(&mut self) {{
{before_save}        }}

        pub fn after_save(&self) -> Vec<(&'static str, String)> {{
            let mut log = Vec::new();
{after_save}            log
        }}

        pub fn delete_actions(&self) -> Vec<String> {{
            let mut actions = Vec::new();
{delete_actions}            actions
        }}
    }}
",
        description = entity.description(),
        name = entity.name,
        schema = schema_of(&entity.module),
        properties = PROPERTIES.marker(&key),
        before_save = BEFORE_SAVE.marker(&key),
        after_save = AFTER_SAVE.marker(&key),
        delete_actions = DELETE_ACTIONS.marker(&key)
    );
    ctx.file(&super::module_file(&entity.module))
        .insert(&MEMBERS, entity.module.key(), code)?;
    Ok(())
}

struct Table;

impl DatabaseGenerator<EntityInfo> for Table {
    fn create_sql(
        &self,
        entity: &EntityInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&entity.module), &entity.name);
        render(ctx, &entity.description(), "CreateTable", &[("object", object.as_str())])
    }

    fn remove_sql(
        &self,
        entity: &EntityInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&entity.module), &entity.name);
        render(ctx, &entity.description(), "DropTable", &[("object", object.as_str())])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<EntityInfo, _>(generate)
        .register_database::<EntityInfo, _>(Table);
}
