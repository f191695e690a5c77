// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Built-in concept library.
//!
//! A compact domain model language with the plugins generating Rust sources
//! and PostgreSQL scripts for it. Every engine capability is exercised by at
//! least one kind:
//!
//! | Kind | Capabilities | Emits |
//! |------|--------------|-------|
//! | [`ModuleInfo`] | | module file, schema |
//! | [`EntityInfo`] | SQL object | struct, table |
//! | [`PropertyInfo`] | macro, validation | field, column |
//! | [`ReferenceConstraintInfo`] | | foreign key |
//! | [`CascadeDeleteInfo`] | validation | delete action in the referenced entity |
//! | [`UniqueMultipleInfo`] | initialization | unique index |
//! | [`AutoCodeInfo`] / [`AutoCodeForEachInfo`] | macro, validation | numbering trigger |
//! | [`LoggingInfo`] / [`LogPropertyInfo`] | macro, extender | change log |
//! | [`SqlViewInfo`] / [`SqlFunctionInfo`] | macro, SQL object | view, function |
//! | [`PolymorphicInfo`] / [`IsSubtypeOfInfo`] | validation, macro | union view |
//! | [`ConceptErrorInfo`] | error | |
//!
//! # Generated file layout
//!
//! ```text
//! <module>.rs
//! └── pub mod <module> {
//!         /*#Members Module <Module>#*/          ← one struct per entity
//!     }
//! ```

mod auto_code;
mod entity;
mod error;
mod logging;
mod module;
mod polymorphic;
mod property;
mod reference;
mod sql_object;
mod unique;

use convert_case::{Case, Casing};

pub use self::{
    auto_code::{AutoCodeForEachInfo, AutoCodeInfo},
    entity::EntityInfo,
    error::ConceptErrorInfo,
    logging::{LogPropertyInfo, LoggingInfo},
    module::ModuleInfo,
    polymorphic::{IsSubtypeOfInfo, PolymorphicInfo},
    property::{PropertyInfo, PropertyType},
    reference::{CascadeDeleteInfo, ReferenceConstraintInfo},
    sql_object::{SqlFunctionInfo, SqlViewInfo},
    unique::UniqueMultipleInfo
};
use crate::{
    codegen::{GenerationContext, PluginRegistry},
    concept::{ConceptRef, unescape_fragment},
    error::GenerateError,
    sql::SqlObject,
    template::Tag
};

/// Structs of a module.
pub const MEMBERS: Tag = Tag::appendable("Members");

/// Fields of an entity struct.
pub const PROPERTIES: Tag = Tag::appendable("Properties");

/// Statements run by `before_save`.
pub const BEFORE_SAVE: Tag = Tag::appendable("BeforeSave");

/// Statements run by `after_save`.
pub const AFTER_SAVE: Tag = Tag::appendable("AfterSave");

/// Statements dependent rows need when a row of the entity is deleted.
pub const DELETE_ACTIONS: Tag = Tag::appendable("DeleteActions");

/// Register every plugin of the library.
pub fn register(registry: &mut PluginRegistry) {
    module::register(registry);
    entity::register(registry);
    property::register(registry);
    reference::register(registry);
    unique::register(registry);
    auto_code::register(registry);
    logging::register(registry);
    sql_object::register(registry);
    polymorphic::register(registry);
}

/// Registry holding the library's plugins.
#[must_use]
pub fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    register(&mut registry);
    registry
}

/// Schema (module name) of a `Module` reference.
fn schema_of(module: &ConceptRef) -> String {
    unescape_fragment(module.key().values())
}

/// Output file of a module.
fn module_file(module: &ConceptRef) -> String {
    format!("{}.rs", schema_of(module).to_case(Case::Snake))
}

/// Rust field name of a property.
fn field_name(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Database object of the data structure behind `reference`.
fn object_of(ctx: &GenerationContext<'_>, reference: &ConceptRef) -> Result<SqlObject, GenerateError> {
    ctx.model()
        .get(reference.key())
        .and_then(|concept| concept.as_sql_object())
        .map(|object| object.sql_object())
        .ok_or_else(|| {
            GenerateError::plugin(reference.to_string(), "not a database-visible data structure")
        })
}

/// Resource lookup that fails with the asking concept's description.
fn render(
    ctx: &GenerationContext<'_>,
    concept: &str,
    key: &str,
    args: &[(&str, &str)]
) -> Result<String, GenerateError> {
    ctx.dialect()
        .render(key, args)
        .ok_or_else(|| GenerateError::plugin(concept, format!("dialect has no {key} resource")))
}
