// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-run memo of extracted SQL objects.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc
};

use tracing::trace;

use super::{SqlObjectName, extract_sql_objects};

/// Extraction results keyed by the raw SQL text.
///
/// Owned by one compilation run; many concepts share byte-identical SQL, so
/// each distinct text is scanned once.
#[derive(Debug, Default)]
pub struct SqlObjectCache {
    entries: HashMap<String, Arc<BTreeSet<SqlObjectName>>>,
    hits:    usize,
    misses:  usize
}

impl SqlObjectCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects referenced by `sql`, scanning only on first sight.
    pub fn objects(&mut self, sql: &str) -> Arc<BTreeSet<SqlObjectName>> {
        if let Some(found) = self.entries.get(sql) {
            self.hits += 1;
            return Arc::clone(found);
        }

        self.misses += 1;
        let found = Arc::new(extract_sql_objects(sql));
        trace!(objects = found.len(), "scanned SQL text");
        self.entries.insert(sql.to_string(), Arc::clone(&found));
        found
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Number of distinct texts scanned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_scanned_once() {
        let mut cache = SqlObjectCache::new();
        let first = cache.objects("SELECT * FROM Demo.Invoice");
        let second = cache.objects("SELECT * FROM Demo.Invoice");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_is_the_raw_text() {
        let mut cache = SqlObjectCache::new();
        cache.objects("SELECT * FROM Demo.Invoice");
        cache.objects("select * from Demo.Invoice");
        assert_eq!(cache.misses(), 2);
    }
}
