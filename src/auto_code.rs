// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Auto-numbering semantics of the code emitted for `AutoCode`.
//!
//! Two policies exist and are kept apart on purpose:
//!
//! | Policy | Column type | Request | Grouping filter |
//! |--------|-------------|---------|-----------------|
//! | [`PrefixedCodePolicy`] | text | `<prefix><#...>+` | ` AND <group>` |
//! | [`IntegerCodePolicy`] | integer | unset value | ` WHERE <group>` |
//!
//! A prefixed request asks for the number following the greatest numeric
//! suffix among codes with the same prefix in the same group, padded to one
//! digit plus one per `#`:
//!
//! ```rust
//! use concept_forge::auto_code::{CodeItem, PrefixedCodePolicy};
//!
//! let existing = vec![CodeItem::new(None, "INV-0007".to_string())];
//! let mut batch = vec![CodeItem::new(None, Some("INV-###+".to_string()))];
//! PrefixedCodePolicy.assign(&existing, &mut batch).unwrap();
//! assert_eq!(batch[0].code.as_deref(), Some("INV-0008"));
//! ```

use std::collections::HashMap;

use thiserror::Error;

/// Auto-numbering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutoCodeError {
    /// Numeric suffix does not fit a 64-bit counter.
    #[error("numeric suffix of code '{code}' is too large")]
    SuffixOverflow { code: String },

    /// Integer code has no successor.
    #[error("integer code {code} has no successor")]
    IntegerOverflow { code: i64 }
}

/// Record taking part in numbering: its group value and code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeItem<T> {
    pub group: Option<String>,
    pub code:  T
}

impl<T> CodeItem<T> {
    #[must_use]
    pub fn new(group: Option<String>, code: T) -> Self {
        Self { group, code }
    }
}

/// Parsed auto-code request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRequest<'a> {
    pub prefix:     &'a str,
    pub min_digits: usize
}

/// Parse `<prefix><#...>+`; `None` when `code` is explicit.
///
/// ```rust
/// use concept_forge::auto_code::parse_request;
///
/// let request = parse_request("INV-##+").unwrap();
/// assert_eq!(request.prefix, "INV-");
/// assert_eq!(request.min_digits, 3);
/// assert!(parse_request("INV-12").is_none());
/// ```
#[must_use]
pub fn parse_request(code: &str) -> Option<CodeRequest<'_>> {
    let body = code.strip_suffix('+')?;
    let prefix = body.trim_end_matches('#');
    Some(CodeRequest {
        prefix,
        min_digits: 1 + (body.len() - prefix.len())
    })
}

/// Text codes with optional auto-numbered numeric suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedCodePolicy;

impl PrefixedCodePolicy {
    /// Replace every request in `batch` with a concrete code.
    ///
    /// Explicit codes in the batch count as existing, whatever their position;
    /// requests are then served in batch order. An unset code is a bare `+`.
    ///
    /// # Errors
    ///
    /// [`AutoCodeError::SuffixOverflow`] when a suffix or its successor
    /// exceeds `u64`.
    pub fn assign(
        &self,
        existing: &[CodeItem<String>],
        batch: &mut [CodeItem<Option<String>>]
    ) -> Result<(), AutoCodeError> {
        let mut known: HashMap<Option<String>, Vec<String>> = HashMap::new();
        for item in existing {
            known.entry(item.group.clone()).or_default().push(item.code.clone());
        }
        for item in batch.iter() {
            if let Some(code) = &item.code
                && parse_request(code).is_none()
            {
                known.entry(item.group.clone()).or_default().push(code.clone());
            }
        }

        for item in batch.iter_mut() {
            let requested = item.code.clone().unwrap_or_else(|| "+".to_string());
            let Some(request) = parse_request(&requested) else {
                continue;
            };
            let codes = known.entry(item.group.clone()).or_default();
            let (max, origin) = max_suffix(codes, request.prefix)?;
            let next = max
                .checked_add(1)
                .ok_or(AutoCodeError::SuffixOverflow { code: origin })?;
            let code = format!("{}{:0width$}", request.prefix, next, width = request.min_digits);
            codes.push(code.clone());
            item.code = Some(code);
        }
        Ok(())
    }

    /// Group condition appended to a query already filtering by prefix.
    #[must_use]
    pub fn grouping_filter(&self, condition: &str) -> String {
        format!(" AND {condition}")
    }
}

/// Greatest numeric suffix after `prefix` and the code carrying it; 0 when
/// there is none.
fn max_suffix(codes: &[String], prefix: &str) -> Result<(u64, String), AutoCodeError> {
    let mut max = 0;
    let mut origin = String::new();
    for code in codes {
        let Some(suffix) = code.strip_prefix(prefix) else {
            continue;
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let value: u64 = suffix.parse().map_err(|_| AutoCodeError::SuffixOverflow {
            code: code.clone()
        })?;
        if value >= max {
            max = value;
            origin.clone_from(code);
        }
    }
    Ok((max, origin))
}

/// Integer codes; an unset value gets the group maximum plus one.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodePolicy;

impl IntegerCodePolicy {
    /// Fill every unset code in `batch`.
    ///
    /// # Errors
    ///
    /// [`AutoCodeError::IntegerOverflow`] when the group maximum is
    /// `i64::MAX`.
    pub fn assign(
        &self,
        existing: &[CodeItem<i64>],
        batch: &mut [CodeItem<Option<i64>>]
    ) -> Result<(), AutoCodeError> {
        let mut max: HashMap<Option<String>, i64> = HashMap::new();
        let explicit = existing
            .iter()
            .map(|item| (&item.group, item.code))
            .chain(
                batch
                    .iter()
                    .filter_map(|item| item.code.map(|code| (&item.group, code)))
            );
        for (group, code) in explicit {
            let entry = max.entry(group.clone()).or_insert(0);
            *entry = (*entry).max(code);
        }

        for item in batch.iter_mut() {
            if item.code.is_none() {
                let entry = max.entry(item.group.clone()).or_insert(0);
                *entry = entry
                    .checked_add(1)
                    .ok_or(AutoCodeError::IntegerOverflow { code: *entry })?;
                item.code = Some(*entry);
            }
        }
        Ok(())
    }

    /// Group condition for a query with no other filter.
    #[must_use]
    pub fn grouping_filter(&self, condition: &str) -> String {
        format!(" WHERE {condition}")
    }
}
