// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Key and reference generation.
//!
//! Produces the `ConceptKind` constants, the ordered `key_values` listing and
//! the `references` listing consumed by the dependency graph.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::ConceptDef;

/// Generate `impl ConceptKind`.
pub fn generate_kind(concept: &ConceptDef) -> TokenStream {
    let ident = &concept.ident;
    let keyword = &concept.keyword;
    let family = &concept.family;
    let key_names: Vec<String> = concept.key_fields().map(|f| f.display_name()).collect();

    quote! {
        impl ::concept_forge::ConceptKind for #ident {
            const KEYWORD: &'static str = #keyword;
            const FAMILY: &'static str = #family;
            const KEY_FIELDS: &'static [&'static str] = &[#(#key_names),*];
        }
    }
}

/// Generate `fn key_values`.
pub fn generate_key_values(concept: &ConceptDef) -> TokenStream {
    let key_idents: Vec<_> = concept.key_fields().map(|f| &f.ident).collect();

    quote! {
        fn key_values(&self) -> ::std::vec::Vec<::std::string::String> {
            ::std::vec![
                #(::concept_forge::KeyFragment::key_fragment(&self.#key_idents)),*
            ]
        }
    }
}

/// Generate `fn references`.
///
/// Kinds without reference fields return an empty vector directly so the
/// generated code carries no unused `mut`.
pub fn generate_references(concept: &ConceptDef) -> TokenStream {
    let refs: Vec<_> = concept.reference_fields().collect();

    if refs.is_empty() {
        return quote! {
            fn references(&self) -> ::std::vec::Vec<::concept_forge::FieldReference<'_>> {
                ::std::vec::Vec::new()
            }
        };
    }

    let collect = refs.iter().map(|field| {
        let ident = &field.ident;
        let name = field.name();
        let is_key = field.key;
        quote! {
            ::concept_forge::ReferenceField::collect_references(
                &self.#ident,
                #name,
                #is_key,
                &mut refs
            );
        }
    });

    quote! {
        fn references(&self) -> ::std::vec::Vec<::concept_forge::FieldReference<'_>> {
            let mut refs = ::std::vec::Vec::new();
            #(#collect)*
            refs
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::DeriveInput;

    use super::*;

    fn def(input: DeriveInput) -> ConceptDef {
        ConceptDef::from_derive_input(&input).unwrap()
    }

    #[test]
    fn key_values_follow_declaration_order() {
        let concept = def(syn::parse_quote! {
            pub struct PropertyInfo {
                #[concept(key)]
                pub data_structure: ConceptRef,
                pub kind: String,
                #[concept(key)]
                pub name: String
            }
        });

        let output = generate_key_values(&concept).to_string();
        let ds = output.find("data_structure").unwrap();
        let name = output.find("name").unwrap();
        assert!(ds < name);
        assert!(!output.contains("kind"));
    }

    #[test]
    fn no_references_returns_new_vec() {
        let concept = def(syn::parse_quote! {
            pub struct ModuleInfo {
                #[concept(key)]
                pub name: String
            }
        });

        let output = generate_references(&concept).to_string();
        assert!(!output.contains("mut refs"));
    }

    #[test]
    fn non_key_references_are_listed() {
        let concept = def(syn::parse_quote! {
            pub struct PropertyInfo {
                #[concept(key)]
                pub data_structure: ConceptRef,
                #[concept(key)]
                pub name: String,
                pub referenced: Option<ConceptRef>
            }
        });

        let output = generate_references(&concept).to_string();
        assert!(output.contains("\"data_structure\""));
        assert!(output.contains("\"referenced\""));
        assert!(!output.contains("\"name\""));
    }
}
