// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Reference shapes matched on cleaned SQL.
//!
//! | Shape | Example |
//! |-------|---------|
//! | keyword | `FROM a.b`, `JOIN a.b`, `INTO a.b`, `MERGE a.b`, `USING a.b` |
//! | call | `a.b(` anywhere |
//! | cross join | `FROM x, a.b` (every `, a.b` after the first `FROM`) |

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use super::{SqlObjectName, lexer::strip_noise};

static KEYWORD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN|INTO|MERGE|USING)\s+(\w+)\s*\.\s*(\w+)")
        .unwrap_or_else(|e| panic!("invalid keyword reference pattern: {e}"))
});

static FIRST_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bFROM\b").unwrap_or_else(|e| panic!("invalid FROM pattern: {e}"))
});

static CROSS_JOIN_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*(\w+)\s*\.\s*(\w+)")
        .unwrap_or_else(|e| panic!("invalid cross join pattern: {e}"))
});

/// Every `schema.name` the SQL text possibly references, deduplicated and
/// sorted.
///
/// ```rust
/// use concept_forge::sql::{SqlObjectName, extract_sql_objects};
///
/// let found = extract_sql_objects("SELECT * FROM Demo.Invoice i, Demo.Customer c");
/// assert!(found.contains(&SqlObjectName::new("Demo", "Invoice")));
/// assert!(found.contains(&SqlObjectName::new("Demo", "Customer")));
/// ```
#[must_use]
pub fn extract_sql_objects(sql: &str) -> BTreeSet<SqlObjectName> {
    let clean = strip_noise(sql);
    let text = clean.text();
    let mut found = BTreeSet::new();

    let mut push = |schema: &str, name: &str| {
        found.insert(SqlObjectName::new(clean.decode(schema), clean.decode(name)));
    };

    for caps in KEYWORD_REFERENCE.captures_iter(text) {
        push(&caps[1], &caps[2]);
    }

    for (schema, name) in function_calls(text) {
        push(schema, name);
    }

    if let Some(from) = FIRST_FROM.find(text) {
        for caps in CROSS_JOIN_REFERENCE.captures_iter(&text[from.end()..]) {
            push(&caps[1], &caps[2]);
        }
    }

    found
}

/// `schema.name(` occurrences, nearest to the end of the text first.
fn function_calls(text: &str) -> Vec<(&str, &str)> {
    text.char_indices()
        .rev()
        .filter(|&(_, c)| c == '(')
        .filter_map(|(open, _)| qualified_name_before(text, open))
        .collect()
}

/// Qualified name ending right before byte index `end` (whitespace allowed
/// around the dot and before the parenthesis).
fn qualified_name_before(text: &str, end: usize) -> Option<(&str, &str)> {
    let before = text[..end].trim_end();
    let (rest, name) = take_word_back(before)?;
    let rest = rest.trim_end().strip_suffix('.')?.trim_end();
    let (_, schema) = take_word_back(rest)?;
    Some((schema, name))
}

/// Split a trailing word off `text`.
fn take_word_back(text: &str) -> Option<(&str, &str)> {
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map(|(index, _)| index)?;
    Some((&text[..start], &text[start..]))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
