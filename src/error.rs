// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types for every compilation phase.
//!
//! | Type | Raised by | Fatal |
//! |------|-----------|-------|
//! | [`AuthoringError`] | validation, unresolved references, error concepts | collected, then fatal |
//! | [`MacroError`] | a macro or initializer | yes |
//! | [`TemplateError`] | [`CodeBuilder`](crate::template::CodeBuilder) | yes |
//! | [`GenerateError`] | generator plugins | yes |
//! | [`MigrationError`] | migration plan persistence | yes |
//! | [`CompileError`] | [`Compiler`](crate::Compiler) | yes |
//!
//! SQL dependency inference never fails: a missed reference only yields fewer
//! ordering edges.

use thiserror::Error;

use crate::config::ConfigError;

/// Authoring error attributed to one concept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{concept}: {message}")]
pub struct AuthoringError {
    /// Human-readable description of the offending concept.
    pub concept: String,

    /// What is wrong with it.
    pub message: String
}

impl AuthoringError {
    #[must_use]
    pub fn new(concept: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            message: message.into()
        }
    }
}

/// Failure inside a macro or an alternative initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{concept}: {message}")]
pub struct MacroError {
    pub concept: String,
    pub message: String
}

impl MacroError {
    #[must_use]
    pub fn new(concept: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            message: message.into()
        }
    }
}

/// Tag template failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Second insertion into a replaceable tag.
    #[error("tag {tag} of {owner} accepts a single fragment and is already filled")]
    TagAlreadyFilled { tag: String, owner: String },

    /// Tag markers nested deeper than the configured limit.
    #[error("tag resolution exceeded depth {limit}; a fragment probably contains its own marker")]
    TooDeep { limit: usize }
}

/// Generator plugin failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Generator rejected its concept.
    #[error("{concept}: {message}")]
    Plugin { concept: String, message: String }
}

impl GenerateError {
    #[must_use]
    pub fn plugin(concept: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            concept: concept.into(),
            message: message.into()
        }
    }
}

/// Persisted migration state failures.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to access {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error
    },

    #[error("invalid concept application data: {0}")]
    Json(#[from] serde_json::Error)
}

/// Any error that aborts a compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// One or more authoring errors, collected.
    #[error("{} authoring error(s):\n{}", .0.len(), format_authoring(.0))]
    Authoring(Vec<AuthoringError>),

    /// Macro expansion did not reach a fixed point.
    #[error(
        "macro expansion did not converge after {iterations} iterations; still producing: {}",
        .churning.join(", ")
    )]
    NonConvergence {
        iterations: usize,
        churning:   Vec<String>
    },

    #[error("macro failed: {0}")]
    Macro(#[from] MacroError),

    /// Dependency cycle, listed in traversal order and closed on its first
    /// element.
    #[error("dependency cycle: {}", .concepts.join(" -> "))]
    Cycle { concepts: Vec<String> },

    #[error("code generation failed: {0}")]
    Generator(#[from] GenerateError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Framework defect, never an authoring problem.
    #[error("internal error: {0}")]
    Internal(String)
}

fn format_authoring(errors: &[AuthoringError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
