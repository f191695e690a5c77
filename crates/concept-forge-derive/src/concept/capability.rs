// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Capability accessor generation.
//!
//! Each requested capability overrides the default `None` accessor of the
//! `Concept` trait with one returning `Some(self)`.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::ConceptDef;

/// Generate the capability accessors requested on the kind.
pub fn generate(concept: &ConceptDef) -> TokenStream {
    let caps = concept.capabilities;
    let mut tokens = TokenStream::new();

    if caps.expand {
        tokens.extend(quote! {
            fn as_macro(&self) -> ::std::option::Option<&dyn ::concept_forge::MacroConcept> {
                ::std::option::Option::Some(self as &dyn ::concept_forge::MacroConcept)
            }
        });
    }

    if caps.validate {
        tokens.extend(quote! {
            fn as_validated(&self) -> ::std::option::Option<&dyn ::concept_forge::ValidatedConcept> {
                ::std::option::Option::Some(self as &dyn ::concept_forge::ValidatedConcept)
            }
        });
    }

    if caps.initialize {
        tokens.extend(quote! {
            fn is_initializer(&self) -> bool {
                true
            }

            fn as_initializer(
                &mut self
            ) -> ::std::option::Option<&mut dyn ::concept_forge::AlternativeInitialization> {
                ::std::option::Option::Some(self as &mut dyn ::concept_forge::AlternativeInitialization)
            }
        });
    }

    if caps.error {
        tokens.extend(quote! {
            fn as_error(&self) -> ::std::option::Option<&dyn ::concept_forge::ErrorConcept> {
                ::std::option::Option::Some(self as &dyn ::concept_forge::ErrorConcept)
            }
        });
    }

    if caps.dependency {
        tokens.extend(quote! {
            fn as_dependency(&self) -> ::std::option::Option<&dyn ::concept_forge::DependencyConcept> {
                ::std::option::Option::Some(self as &dyn ::concept_forge::DependencyConcept)
            }
        });
    }

    if caps.sql_object {
        tokens.extend(quote! {
            fn as_sql_object(&self) -> ::std::option::Option<&dyn ::concept_forge::SqlObjectConcept> {
                ::std::option::Option::Some(self as &dyn ::concept_forge::SqlObjectConcept)
            }
        });
    }

    tokens
}
