// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Compiler configuration.
//!
//! Options are built in code or loaded from TOML. Every field has a default,
//! so an empty document is valid:
//!
//! ```toml
//! max_macro_iterations = 100
//! error_policy = "collect_all"
//! max_tag_depth = 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How authoring errors are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Collect every authoring error before aborting.
    #[default]
    CollectAll,

    /// Abort on the first authoring error.
    FailFast
}

/// Tunables of one compilation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Upper bound on macro passes (and on initialization sweeps per pass).
    pub max_macro_iterations: usize,

    pub error_policy: ErrorPolicy,

    /// Upper bound on nested tag resolution.
    pub max_tag_depth: usize
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_macro_iterations: 100,
            error_policy:         ErrorPolicy::CollectAll,
            max_tag_depth:        32
        }
    }
}

impl CompilerOptions {
    /// Parse options from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when a bound is zero.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a TOML file.
    ///
    /// # Errors
    ///
    /// Same as [`from_toml_str`](Self::from_toml_str), plus
    /// [`ConfigError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source
        })?;
        Self::from_toml_str(&source)
    }

    #[must_use]
    pub fn with_max_macro_iterations(mut self, value: usize) -> Self {
        self.max_macro_iterations = value;
        self
    }

    #[must_use]
    pub fn with_error_policy(mut self, value: ErrorPolicy) -> Self {
        self.error_policy = value;
        self
    }

    #[must_use]
    pub fn with_max_tag_depth(mut self, value: usize) -> Self {
        self.max_tag_depth = value;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_macro_iterations == 0 {
            return Err(ConfigError::Invalid("max_macro_iterations must be positive".into()));
        }
        if self.max_tag_depth == 0 {
            return Err(ConfigError::Invalid("max_tag_depth must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error
    },

    #[error("invalid compiler options: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid compiler options: {0}")]
    Invalid(String)
}
