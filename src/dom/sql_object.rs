// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Hand-written SQL views and functions.
//!
//! Both kinds scan their SQL text during expansion and emit `SqlDependsOn*`
//! concepts for every known database object they mention, so they are created
//! after (and removed before) the objects they read.

use super::{render, schema_of};
use crate::{
    Concept,
    codegen::{DatabaseGenerator, GenerationContext, PluginRegistry},
    concept::{ConceptRef, MacroConcept, SqlObjectConcept},
    error::{GenerateError, MacroError},
    expand::MacroContext,
    sql::{SqlObject, SqlObjectKind}
};

#[derive(Debug, Clone, Concept)]
#[concept(expand, sql_object)]
pub struct SqlViewInfo {
    #[concept(key)]
    pub module: ConceptRef,

    #[concept(key)]
    pub name: String,

    /// `SELECT` statement defining the view.
    pub source: String
}

#[derive(Debug, Clone, Concept)]
#[concept(expand, sql_object)]
pub struct SqlFunctionInfo {
    #[concept(key)]
    pub module: ConceptRef,

    #[concept(key)]
    pub name: String,

    /// Argument list without parentheses, e.g. `code text`.
    pub arguments: String,

    pub returns: String,

    /// Function body in the `sql` language.
    pub source: String
}

impl SqlViewInfo {
    #[must_use]
    pub fn new(module: &ConceptRef, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            module: module.clone(),
            name:   name.into(),
            source: source.into()
        }
    }
}

impl SqlFunctionInfo {
    #[must_use]
    pub fn new(
        module: &ConceptRef,
        name: impl Into<String>,
        arguments: impl Into<String>,
        returns: impl Into<String>,
        source: impl Into<String>
    ) -> Self {
        Self {
            module:    module.clone(),
            name:      name.into(),
            arguments: arguments.into(),
            returns:   returns.into(),
            source:    source.into()
        }
    }
}

impl MacroConcept for SqlViewInfo {
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        Ok(ctx.sql_dependencies(&ConceptRef::new(self.key()), &self.source))
    }
}

impl MacroConcept for SqlFunctionInfo {
    fn create_new_concepts(
        &self,
        ctx: &mut MacroContext<'_>
    ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
        Ok(ctx.sql_dependencies(&ConceptRef::new(self.key()), &self.source))
    }
}

impl SqlObjectConcept for SqlViewInfo {
    fn sql_object(&self) -> SqlObject {
        SqlObject::from_module(&self.module, &self.name, SqlObjectKind::SqlView)
    }
}

impl SqlObjectConcept for SqlFunctionInfo {
    fn sql_object(&self) -> SqlObject {
        SqlObject::from_module(&self.module, &self.name, SqlObjectKind::SqlFunction)
    }
}

struct View;

impl DatabaseGenerator<SqlViewInfo> for View {
    fn create_sql(
        &self,
        view: &SqlViewInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx.dialect().object_name(&schema_of(&view.module), &view.name);
        let body = view.source.trim().trim_end_matches(';');
        render(ctx, &view.description(), "CreateView", &[
            ("object", object.as_str()),
            ("body", body)
        ])
    }

    fn remove_sql(
        &self,
        view: &SqlViewInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx.dialect().object_name(&schema_of(&view.module), &view.name);
        render(ctx, &view.description(), "DropView", &[("object", object.as_str())])
    }
}

struct Function;

impl DatabaseGenerator<SqlFunctionInfo> for Function {
    fn create_sql(
        &self,
        function: &SqlFunctionInfo,
        ctx: &mut GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&function.module), &function.name);
        render(ctx, &function.description(), "CreateFunction", &[
            ("object", object.as_str()),
            ("arguments", function.arguments.as_str()),
            ("returns", function.returns.as_str()),
            ("body", function.source.trim())
        ])
    }

    fn remove_sql(
        &self,
        function: &SqlFunctionInfo,
        ctx: &GenerationContext<'_>
    ) -> Result<String, GenerateError> {
        let object = ctx
            .dialect()
            .object_name(&schema_of(&function.module), &function.name);
        render(ctx, &function.description(), "DropFunction", &[
            ("object", object.as_str()),
            ("arguments", function.arguments.as_str())
        ])
    }
}

pub(super) fn register(registry: &mut PluginRegistry) {
    registry
        .register_database::<SqlViewInfo, _>(View)
        .register_database::<SqlFunctionInfo, _>(Function);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dom::EntityInfo,
        model::ConceptModel,
        sql::{SqlDependsOnDataStructureInfo, SqlDependsOnSqlFunctionInfo, SqlObjectCache}
    };

    fn demo() -> ConceptRef {
        ConceptRef::from_values("Module", ["Demo"])
    }

    #[test]
    fn view_depends_on_tables_and_functions_it_reads() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(EntityInfo::new(&demo(), "Invoice")));
        model.insert(Box::new(SqlFunctionInfo::new(
            &demo(),
            "Total",
            "id uuid",
            "numeric",
            "SELECT 1"
        )));
        let view = SqlViewInfo::new(
            &demo(),
            "InvoiceTotals",
            "SELECT i.\"ID\", Demo.Total(i.\"ID\") FROM Demo.Invoice i"
        );
        let mut cache = SqlObjectCache::new();
        let mut ctx = MacroContext::new(&model, &mut cache);

        let created = view.create_new_concepts(&mut ctx).unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().any(|c| c.is::<SqlDependsOnDataStructureInfo>()));
        assert!(created.iter().any(|c| c.is::<SqlDependsOnSqlFunctionInfo>()));
    }

    #[test]
    fn view_is_a_sql_object_of_its_module() {
        let view = SqlViewInfo::new(&demo(), "Totals", "SELECT 1");
        let object = view.sql_object();
        assert_eq!((object.schema.as_str(), object.name.as_str()), ("Demo", "Totals"));
        assert_eq!(object.kind, SqlObjectKind::SqlView);
    }
}
