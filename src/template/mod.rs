// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Tag-based template builder.
//!
//! Generated output is opaque text with named insertion points. A generator
//! writes a skeleton containing tag markers for its own concept; generators
//! of later concepts insert fragments into those tags. Markers are
//! substituted only when the builder is finally resolved, after every
//! generator has run.
//!
//! ```text
//! skeleton:   struct Invoice {\n/*#Properties DataStructure Demo.Invoice#*/\n}
//! inserts:    Properties @ Demo.Invoice  ← "    code: String,"
//!             Properties @ Demo.Invoice  ← "    total: i64,"
//! resolved:   struct Invoice {\n    code: String,\n    total: i64,\n}
//! ```
//!
//! Fragments may contain markers themselves; resolution recurses up to a
//! depth limit. A tag nobody inserted into resolves to the empty string.

mod tag;

use std::collections::{HashMap, HashSet};

use tracing::warn;

pub use self::tag::{Tag, TagMode};
use self::tag::{MARKER_CLOSE, MARKER_OPEN};
use crate::{concept::ConceptKey, error::TemplateError};

/// Default limit of nested marker resolution.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug)]
struct TagSlot {
    tag:       Tag,
    owner:     ConceptKey,
    fragments: Vec<String>
}

/// Append-only text builder with tag extension points.
#[derive(Debug)]
pub struct CodeBuilder {
    code:      String,
    slots:     HashMap<String, TagSlot>,
    resolved:  HashSet<String>,
    max_depth: usize
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            code: String::new(),
            slots: HashMap::new(),
            resolved: HashSet::new(),
            max_depth
        }
    }

    /// Append skeleton text.
    pub fn insert_code(&mut self, code: &str) {
        self.code.push_str(code);
    }

    /// Insert a fragment into `tag` of `owner`.
    ///
    /// # Errors
    ///
    /// [`TemplateError::TagAlreadyFilled`] on a second insertion into a
    /// replaceable tag.
    pub fn insert(
        &mut self,
        tag: &Tag,
        owner: &ConceptKey,
        fragment: impl Into<String>
    ) -> Result<(), TemplateError> {
        let slot = self
            .slots
            .entry(tag.marker(owner))
            .or_insert_with(|| TagSlot {
                tag:       *tag,
                owner:     owner.clone(),
                fragments: Vec::new()
            });

        if slot.tag.mode() == TagMode::Replaceable && !slot.fragments.is_empty() {
            return Err(TemplateError::TagAlreadyFilled {
                tag:   tag.name().to_string(),
                owner: owner.to_string()
            });
        }

        slot.fragments.push(fragment.into());
        Ok(())
    }

    /// Skeleton text accumulated so far, markers unresolved.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Substitute every marker in `text` with its tag's content.
    ///
    /// # Errors
    ///
    /// [`TemplateError::TooDeep`] when markers nest beyond the depth limit.
    pub fn resolve_text(&mut self, text: &str) -> Result<String, TemplateError> {
        let mut used = HashSet::new();
        let resolved = self.resolve_at(text, 0, &mut used)?;
        self.resolved.extend(used);
        Ok(resolved)
    }

    /// Resolve the skeleton and report fragments nobody could see.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_text`](Self::resolve_text).
    pub fn build(mut self) -> Result<String, TemplateError> {
        let code = std::mem::take(&mut self.code);
        let resolved = self.resolve_text(&code)?;
        self.report_orphans();
        Ok(resolved)
    }

    /// Warn about tags that received fragments but whose marker was never
    /// resolved.
    pub fn report_orphans(&self) {
        let mut orphans: Vec<&TagSlot> = self
            .slots
            .iter()
            .filter(|(marker, _)| !self.resolved.contains(*marker))
            .map(|(_, slot)| slot)
            .collect();
        orphans.sort_by(|a, b| (&a.owner, a.tag.name()).cmp(&(&b.owner, b.tag.name())));

        for slot in orphans {
            warn!(
                tag = slot.tag.name(),
                owner = %slot.owner,
                fragments = slot.fragments.len(),
                "tag content was inserted but its marker never appears"
            );
        }
    }

    fn resolve_at(
        &self,
        text: &str,
        depth: usize,
        used: &mut HashSet<String>
    ) -> Result<String, TemplateError> {
        if depth > self.max_depth {
            return Err(TemplateError::TooDeep {
                limit: self.max_depth
            });
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find(MARKER_OPEN) {
            let after_open = &rest[open + MARKER_OPEN.len()..];
            let Some(close) = after_open.find(MARKER_CLOSE) else {
                break;
            };

            out.push_str(&rest[..open]);
            let marker_len = MARKER_OPEN.len() + close + MARKER_CLOSE.len();
            let marker = &rest[open..open + marker_len];

            if let Some(slot) = self.slots.get(marker) {
                used.insert(marker.to_string());
                let rendered = slot.tag.render(&slot.fragments);
                out.push_str(&self.resolve_at(&rendered, depth + 1, used)?);
            }

            rest = &rest[open + marker_len..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
