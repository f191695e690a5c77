// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Tag definitions.
//!
//! Tags are declared once as constants next to the generator that owns the
//! extension point and used by every generator writing into it:
//!
//! ```rust
//! use concept_forge::template::Tag;
//!
//! pub const COLUMNS: Tag = Tag::list("Columns", ",\n    ");
//! pub const BODY: Tag = Tag::replaceable("Body");
//! ```

use crate::concept::ConceptKey;

/// How fragments inserted into a tag are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// At most one fragment.
    Replaceable,

    /// Any number of fragments in insertion order.
    ///
    /// `{0}` in `first` / `next` is replaced by the fragment; `separator` is
    /// written between consecutive fragments.
    Appendable {
        first:     &'static str,
        next:      &'static str,
        separator: &'static str
    }
}

/// Named extension point, scoped to an owner concept when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    name: &'static str,
    mode: TagMode
}

impl Tag {
    #[must_use]
    pub const fn replaceable(name: &'static str) -> Self {
        Self {
            name,
            mode: TagMode::Replaceable
        }
    }

    #[must_use]
    pub const fn appendable(name: &'static str) -> Self {
        Self {
            name,
            mode: TagMode::Appendable {
                first:     "{0}",
                next:      "{0}",
                separator: ""
            }
        }
    }

    /// Appendable tag rendering as `A<sep>B<sep>C`.
    #[must_use]
    pub const fn list(name: &'static str, separator: &'static str) -> Self {
        Self {
            name,
            mode: TagMode::Appendable {
                first: "{0}",
                next: "{0}",
                separator
            }
        }
    }

    /// Make the tag appendable with distinct formats for the first and the
    /// following fragments, keeping any separator.
    #[must_use]
    pub const fn with_format(self, first: &'static str, next: &'static str) -> Self {
        let separator = match self.mode {
            TagMode::Appendable { separator, .. } => separator,
            TagMode::Replaceable => ""
        };
        Self {
            name: self.name,
            mode: TagMode::Appendable {
                first,
                next,
                separator
            }
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn mode(&self) -> TagMode {
        self.mode
    }

    /// Marker text standing for this tag of `owner` in a skeleton.
    ///
    /// ```rust
    /// use concept_forge::{ConceptKey, template::Tag};
    ///
    /// let key = ConceptKey::from_raw("DataStructure Demo.Invoice");
    /// assert_eq!(
    ///     Tag::appendable("Properties").marker(&key),
    ///     "/*#Properties DataStructure Demo.Invoice#*/"
    /// );
    /// ```
    #[must_use]
    pub fn marker(&self, owner: &ConceptKey) -> String {
        format!("{MARKER_OPEN}{} {owner}{MARKER_CLOSE}", self.name)
    }

    /// Combine fragments according to the mode.
    pub(crate) fn render(&self, fragments: &[String]) -> String {
        match self.mode {
            TagMode::Replaceable => fragments.concat(),
            TagMode::Appendable {
                first,
                next,
                separator
            } => {
                let mut out = String::new();
                for (index, fragment) in fragments.iter().enumerate() {
                    if index == 0 {
                        out.push_str(&first.replace("{0}", fragment));
                    } else {
                        out.push_str(separator);
                        out.push_str(&next.replace("{0}", fragment));
                    }
                }
                out
            }
        }
    }
}

pub(crate) const MARKER_OPEN: &str = "/*#";
pub(crate) const MARKER_CLOSE: &str = "#*/";

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn list_joins_with_separator() {
        let tag = Tag::list("Columns", ", ");
        assert_eq!(tag.render(&fragments(&["A", "B", "C"])), "A, B, C");
        assert_eq!(tag.render(&fragments(&["A"])), "A");
        assert_eq!(tag.render(&[]), "");
    }

    #[test]
    fn format_distinguishes_first_fragment() {
        let tag = Tag::appendable("Where").with_format("WHERE {0}", " AND {0}");
        assert_eq!(tag.render(&fragments(&["a", "b"])), "WHERE a AND b");
    }

    #[test]
    fn with_format_keeps_separator() {
        let tag = Tag::list("Args", ",").with_format("{0}", " {0}");
        assert_eq!(tag.render(&fragments(&["x", "y"])), "x, y");
    }

    #[test]
    fn constants_are_usable() {
        const BODY: Tag = Tag::replaceable("Body");
        assert_eq!(BODY.name(), "Body");
        assert_eq!(BODY.mode(), TagMode::Replaceable);
    }
}
