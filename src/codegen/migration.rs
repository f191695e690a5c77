// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Incremental database migration between two compilation runs.
//!
//! # Algorithm
//!
//! ```text
//! changed   = keys in both runs with a different create script
//! dropped   = keys only in the old run
//! affected  = changed ∪ dropped ∪ everything in the old run depending on them
//!
//! remove:  old applications in `affected`, reverse old creation order
//! create:  new applications that are new or in `affected`, new creation order
//! ```

use std::{
    collections::{BTreeSet, HashMap},
    path::Path
};

use tracing::info;

use super::{ConceptApplication, join_scripts};
use crate::{concept::ConceptKey, error::MigrationError};

/// Scripts turning the database of one run into the database of the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Applications to remove, in execution order.
    pub remove: Vec<ConceptApplication>,

    /// Applications to create, in execution order.
    pub create: Vec<ConceptApplication>
}

impl MigrationPlan {
    /// Plan the migration from `old` to `new` (both in creation order).
    #[must_use]
    pub fn between(old: &[ConceptApplication], new: &[ConceptApplication]) -> Self {
        let new_by_key: HashMap<&ConceptKey, &ConceptApplication> =
            new.iter().map(|app| (&app.key, app)).collect();
        let old_keys: BTreeSet<&ConceptKey> = old.iter().map(|app| &app.key).collect();

        let mut affected: BTreeSet<&ConceptKey> = old
            .iter()
            .filter(|app| {
                new_by_key
                    .get(&app.key)
                    .is_none_or(|current| current.create_sql != app.create_sql)
            })
            .map(|app| &app.key)
            .collect();

        loop {
            let before = affected.len();
            for app in old {
                if !affected.contains(&app.key)
                    && app.depends_on.iter().any(|dep| affected.contains(dep))
                {
                    affected.insert(&app.key);
                }
            }
            if affected.len() == before {
                break;
            }
        }

        let remove = old
            .iter()
            .rev()
            .filter(|app| affected.contains(&app.key))
            .cloned()
            .collect();
        let create: Vec<ConceptApplication> = new
            .iter()
            .filter(|app| !old_keys.contains(&app.key) || affected.contains(&app.key))
            .cloned()
            .collect();

        let plan = Self { remove, create };
        info!(
            remove = plan.remove.len(),
            create = plan.create.len(),
            "planned database migration"
        );
        plan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty()
    }

    /// Remove scripts followed by create scripts.
    #[must_use]
    pub fn script(&self) -> String {
        join_scripts(
            self.remove
                .iter()
                .map(|app| app.remove_sql.as_str())
                .chain(self.create.iter().map(|app| app.create_sql.as_str()))
        )
    }
}

/// Persist applications as JSON.
///
/// # Errors
///
/// [`MigrationError::Io`] or [`MigrationError::Json`].
pub fn save_applications(
    path: impl AsRef<Path>,
    applications: &[ConceptApplication]
) -> Result<(), MigrationError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(applications)?;
    std::fs::write(path, json).map_err(|source| MigrationError::Io {
        path: path.display().to_string(),
        source
    })
}

/// Load applications persisted by [`save_applications`].
///
/// # Errors
///
/// [`MigrationError::Io`] or [`MigrationError::Json`].
pub fn load_applications(path: impl AsRef<Path>) -> Result<Vec<ConceptApplication>, MigrationError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| MigrationError::Io {
        path: path.display().to_string(),
        source
    })?;
    Ok(serde_json::from_str(&json)?)
}
