// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attribute parsing for `#[derive(Concept)]`.
//!
//! Darling parses the raw `#[concept(...)]` attributes into [`ConceptAttrs`];
//! [`ConceptDef`] adds the derived pieces every generator needs (resolved
//! keyword and family, key fields, reference fields).
//!
//! # Supported Attributes
//!
//! | Attribute | Level | Default | Description |
//! |-----------|-------|---------|-------------|
//! | `keyword` | kind | struct name without `Info` | Keyword used in descriptions |
//! | `family` | kind | keyword | Key family shared by interchangeable kinds |
//! | `expand` | kind | `false` | Macro expansion capability |
//! | `validate` | kind | `false` | Semantic validation capability |
//! | `initialize` | kind | `false` | Alternative initialization capability |
//! | `error` | kind | `false` | Deferred error placeholder capability |
//! | `dependency` | kind | `false` | Declares an ordering edge |
//! | `sql_object` | kind | `false` | Produces a database-visible object |
//! | `key` | field | `false` | Field is part of the key |

use convert_case::{Case, Casing};
use darling::{FromDeriveInput, FromField, ast::Data};
use syn::{DeriveInput, GenericArgument, Ident, PathArguments, Type};

/// Kind-level attributes parsed from `#[concept(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(concept))]
pub struct ConceptAttrs {
    /// Struct identifier (e.g., `EntityInfo`).
    pub ident: Ident,

    /// Struct generics; concept kinds must not have any.
    pub generics: syn::Generics,

    /// Named fields.
    pub data: Data<(), FieldAttrs>,

    /// Explicit keyword.
    #[darling(default)]
    pub keyword: Option<String>,

    /// Explicit key family.
    #[darling(default)]
    pub family: Option<String>,

    #[darling(default)]
    pub expand: bool,

    #[darling(default)]
    pub validate: bool,

    #[darling(default)]
    pub initialize: bool,

    #[darling(default)]
    pub error: bool,

    #[darling(default)]
    pub dependency: bool,

    #[darling(default)]
    pub sql_object: bool
}

/// Field-level attributes parsed from `#[concept(...)]`.
#[derive(Debug, FromField)]
#[darling(attributes(concept))]
pub struct FieldAttrs {
    /// Field identifier; always present for named structs.
    pub ident: Option<Ident>,

    /// Field type, inspected to detect reference fields.
    pub ty: Type,

    /// Whether the field is part of the key.
    #[darling(default)]
    pub key: bool
}

/// Parsed field ready for code generation.
#[derive(Debug)]
pub struct FieldDef {
    /// Rust field name.
    pub ident: Ident,

    /// Whether the field is part of the key.
    pub key: bool,

    /// Whether the field holds one or more `ConceptRef`s.
    pub reference: bool
}

impl FieldDef {
    /// Field name as used by `find_by_reference` (the Rust name).
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// Field name as shown in key listings (PascalCase).
    pub fn display_name(&self) -> String {
        self.ident.to_string().to_case(Case::Pascal)
    }
}

/// Capability flags requested on the kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct Capabilities {
    pub expand:     bool,
    pub validate:   bool,
    pub initialize: bool,
    pub error:      bool,
    pub dependency: bool,
    pub sql_object: bool
}

/// Complete parsed concept kind definition.
#[derive(Debug)]
pub struct ConceptDef {
    /// Struct identifier.
    pub ident: Ident,

    /// Keyword used in descriptions (e.g., `Entity`).
    pub keyword: String,

    /// Key family (e.g., `DataStructure`).
    pub family: String,

    /// All fields in declaration order.
    pub fields: Vec<FieldDef>,

    /// Requested capabilities.
    pub capabilities: Capabilities
}

impl ConceptDef {
    /// Parse a concept definition from syn's `DeriveInput`.
    ///
    /// # Errors
    ///
    /// - Applied to an enum, union, tuple struct or unit struct
    /// - Struct has generic parameters
    /// - No field is marked `#[concept(key)]`
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = ConceptAttrs::from_derive_input(input)?;

        if !attrs.generics.params.is_empty() {
            return Err(
                darling::Error::custom("Concept kinds cannot be generic").with_span(&attrs.ident)
            );
        }

        let raw_fields = match attrs.data {
            Data::Struct(fields) => fields.fields,
            Data::Enum(_) => {
                return Err(darling::Error::custom("Concept can only be derived for structs")
                    .with_span(&attrs.ident));
            }
        };

        let mut fields = Vec::with_capacity(raw_fields.len());
        for field in raw_fields {
            let ident = field.ident.ok_or_else(|| {
                darling::Error::custom("Concept requires named fields").with_span(&attrs.ident)
            })?;
            fields.push(FieldDef {
                ident,
                key: field.key,
                reference: is_reference_type(&field.ty)
            });
        }

        if !fields.iter().any(|f| f.key) {
            return Err(darling::Error::custom(
                "Concept must have at least one field with #[concept(key)]"
            )
            .with_span(&attrs.ident));
        }

        let keyword = attrs
            .keyword
            .unwrap_or_else(|| default_keyword(&attrs.ident.to_string()));
        let family = attrs.family.unwrap_or_else(|| keyword.clone());

        Ok(Self {
            ident: attrs.ident,
            keyword,
            family,
            fields,
            capabilities: Capabilities {
                expand:     attrs.expand,
                validate:   attrs.validate,
                initialize: attrs.initialize,
                error:      attrs.error,
                dependency: attrs.dependency,
                sql_object: attrs.sql_object
            }
        })
    }

    /// Key fields in declaration order.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.key)
    }

    /// Reference fields (key and non-key) in declaration order.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.reference)
    }
}

/// `EntityInfo` → `Entity`, `Module` → `Module`.
fn default_keyword(struct_name: &str) -> String {
    match struct_name.strip_suffix("Info") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => struct_name.to_string()
    }
}

/// Whether the type is `ConceptRef`, `Option<ConceptRef>` or
/// `Vec<ConceptRef>`.
fn is_reference_type(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };

    if segment.ident == "ConceptRef" {
        return true;
    }

    if segment.ident != "Option" && segment.ident != "Vec" {
        return false;
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| {
            matches!(arg, GenericArgument::Type(inner) if is_reference_type(inner))
        }),
        _ => false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keyword_strips_info() {
        assert_eq!(default_keyword("EntityInfo"), "Entity");
        assert_eq!(default_keyword("Module"), "Module");
        assert_eq!(default_keyword("Info"), "Info");
    }

    #[test]
    fn detects_reference_shapes() {
        let plain: Type = syn::parse_quote!(ConceptRef);
        let qualified: Type = syn::parse_quote!(concept_forge::ConceptRef);
        let optional: Type = syn::parse_quote!(Option<ConceptRef>);
        let many: Type = syn::parse_quote!(Vec<ConceptRef>);
        let text: Type = syn::parse_quote!(String);
        let optional_text: Type = syn::parse_quote!(Option<String>);

        assert!(is_reference_type(&plain));
        assert!(is_reference_type(&qualified));
        assert!(is_reference_type(&optional));
        assert!(is_reference_type(&many));
        assert!(!is_reference_type(&text));
        assert!(!is_reference_type(&optional_text));
    }

    #[test]
    fn parses_fields_and_family() {
        let input: DeriveInput = syn::parse_quote! {
            #[concept(keyword = "Polymorphic", family = "DataStructure", sql_object)]
            pub struct PolymorphicInfo {
                #[concept(key)]
                pub module: ConceptRef,
                #[concept(key)]
                pub name: String,
                pub description: Option<String>
            }
        };

        let def = ConceptDef::from_derive_input(&input).unwrap();
        assert_eq!(def.keyword, "Polymorphic");
        assert_eq!(def.family, "DataStructure");
        assert!(def.capabilities.sql_object);
        assert!(!def.capabilities.expand);
        assert_eq!(def.key_fields().count(), 2);
        assert_eq!(def.reference_fields().count(), 1);
        assert_eq!(def.fields[0].display_name(), "Module");
    }

    fn rejection(input: DeriveInput) -> String {
        ConceptDef::from_derive_input(&input).unwrap_err().to_string()
    }

    #[test]
    fn rejects_enums() {
        let message = rejection(syn::parse_quote! {
            pub enum Stage {
                Draft
            }
        });
        assert_eq!(message, "Concept can only be derived for structs");
    }

    #[test]
    fn rejects_tuple_structs() {
        let message = rejection(syn::parse_quote! {
            pub struct Pair(String, String);
        });
        assert_eq!(message, "Concept requires named fields");
    }

    #[test]
    fn rejects_generics() {
        let message = rejection(syn::parse_quote! {
            pub struct Holder<T> {
                #[concept(key)]
                pub name: String,
                pub value: T
            }
        });
        assert_eq!(message, "Concept kinds cannot be generic");
    }

    #[test]
    fn rejects_kinds_without_key() {
        let message = rejection(syn::parse_quote! {
            pub struct Loose {
                pub name: String
            }
        });
        assert_eq!(message, "Concept must have at least one field with #[concept(key)]");
    }

    #[test]
    fn snake_case_field_displays_pascal() {
        let input: DeriveInput = syn::parse_quote! {
            pub struct PropertyInfo {
                #[concept(key)]
                pub data_structure: ConceptRef,
                #[concept(key)]
                pub name: String
            }
        };

        let def = ConceptDef::from_derive_input(&input).unwrap();
        assert_eq!(def.fields[0].name(), "data_structure");
        assert_eq!(def.fields[0].display_name(), "DataStructure");
    }
}
