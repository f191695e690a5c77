// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Module: a namespace for entities and a database schema.

use super::{MEMBERS, field_name, module_file, render};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::ConceptRef,
    error::GenerateError
};

#[derive(Debug, Clone, Concept)]
pub struct ModuleInfo {
    #[concept(key)]
    pub name: String
}

impl ModuleInfo {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn reference(&self) -> ConceptRef {
        ConceptRef::new(self.key())
    }
}

fn generate(module: &ModuleInfo, ctx: &mut GenerationContext<'_>) -> Result<(), GenerateError> {
    let reference = module.reference();
    let marker = MEMBERS.marker(reference.key());
    ctx.file(&module_file(&reference)).insert_code(&format!(
        "// Generated from {}.\n\npub mod {} {{\n{marker}}}\n",
        module.description(),
        field_name(&module.name)
    ));
    Ok(())
}

struct Schema;

impl DatabaseGenerator<ModuleInfo> for Schema {
    fn create_sql(
        &self,
        module: &ModuleInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let schema = ctx.dialect().quote_identifier(&module.name);
        render(ctx, &module.description(), "CreateSchema", &[("schema", schema.as_str())])
    }

    fn remove_sql(
        &self,
        module: &ModuleInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let schema = ctx.dialect().quote_identifier(&module.name);
        render(ctx, &module.description(), "DropSchema", &[("schema", schema.as_str())])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_generator::<ModuleInfo, _>(generate)
        .register_database::<ModuleInfo, _>(Schema);
}
