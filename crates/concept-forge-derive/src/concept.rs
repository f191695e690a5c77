// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Concept derive macro implementation.
//!
//! # Architecture
//!
//! ```text
//! concept.rs (orchestrator)
//! │
//! ├── parse.rs      → Attribute parsing (ConceptDef, FieldDef)
//! ├── key.rs        → ConceptKind constants, key values, reference listing
//! └── capability.rs → Capability accessors (as_macro, as_validated, ...)
//! ```

mod capability;
mod key;
mod parse;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use self::parse::ConceptDef;

/// Main entry point for the Concept derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into()
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let concept = ConceptDef::from_derive_input(input)?;
    Ok(generate(&concept))
}

fn generate(concept: &ConceptDef) -> TokenStream2 {
    let ident = &concept.ident;
    let kind = key::generate_kind(concept);
    let key_values = key::generate_key_values(concept);
    let references = key::generate_references(concept);
    let capabilities = capability::generate(concept);
    let keyword = &concept.keyword;
    let family = &concept.family;

    quote! {
        #kind

        impl ::concept_forge::Concept for #ident {
            fn keyword(&self) -> &'static str {
                #keyword
            }

            fn family(&self) -> &'static str {
                #family
            }

            #key_values

            #references

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn clone_concept(&self) -> ::std::boxed::Box<dyn ::concept_forge::Concept> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            #capabilities
        }
    }
}
