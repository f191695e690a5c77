// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Lexical noise removal.
//!
//! Anything that could hide or fake a reference is blanked out before the
//! reference shapes are matched:
//!
//! | Construct | Result |
//! |-----------|--------|
//! | `-- comment` | space |
//! | `/* nested /* comment */ */` | space |
//! | `'literal ''with'' quotes'` | space |
//! | `"quoted"` | space |
//! | `[Bracketed Name]]s]` | placeholder token, decoded after matching |
//!
//! A bracketed identifier containing `[` or a line break is not supported
//! and becomes a space; the reference it names is simply not found.

const PLACEHOLDER_PREFIX: &str = "__bracketed_";
const PLACEHOLDER_SUFFIX: &str = "__";

/// SQL text with noise removed and bracketed identifiers parked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSql {
    text:      String,
    bracketed: Vec<String>
}

impl CleanSql {
    /// Cleaned text; bracketed identifiers appear as placeholder words.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Turn a matched word back into the identifier it stands for.
    #[must_use]
    pub fn decode(&self, word: &str) -> String {
        word.strip_prefix(PLACEHOLDER_PREFIX)
            .and_then(|rest| rest.strip_suffix(PLACEHOLDER_SUFFIX))
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.bracketed.get(index))
            .cloned()
            .unwrap_or_else(|| word.to_string())
    }
}

/// Remove comments, literals and quoted strings from `sql`.
///
/// ```rust
/// use concept_forge::sql::strip_noise;
///
/// let clean = strip_noise("SELECT 'FROM x.y' -- FROM a.b\nFROM [My Module].t");
/// assert!(!clean.text().contains("x.y"));
/// assert!(!clean.text().contains("a.b"));
/// assert!(clean.text().contains("FROM __bracketed_0__.t"));
/// assert_eq!(clean.decode("__bracketed_0__"), "My Module");
/// ```
#[must_use]
pub fn strip_noise(sql: &str) -> CleanSql {
    let chars: Vec<char> = sql.chars().collect();
    let mut text = String::with_capacity(sql.len());
    let mut bracketed = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match (c, next) {
            ('-', Some('-')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                text.push(' ');
            }
            ('/', Some('*')) => {
                i = skip_block_comment(&chars, i);
                text.push(' ');
            }
            ('\'', _) | ('"', _) => {
                i = skip_quoted(&chars, i, c);
                text.push(' ');
            }
            ('[', _) => match read_bracketed(&chars, i) {
                Ok((name, end)) => {
                    text.push_str(&format!(
                        "{PLACEHOLDER_PREFIX}{}{PLACEHOLDER_SUFFIX}",
                        bracketed.len()
                    ));
                    bracketed.push(name);
                    i = end;
                }
                Err(end) => {
                    text.push(' ');
                    i = end;
                }
            },
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    CleanSql { text, bracketed }
}

/// Index just past the block comment opened at `start`; comments nest.
fn skip_block_comment(chars: &[char], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            ('/', Some('*')) => {
                depth += 1;
                i += 2;
            }
            ('*', Some('/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1
        }
    }
    i
}

/// Index just past the quoted run opened at `start`; a doubled quote is an
/// escape.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Identifier and end index of the bracketed name opened at `start`.
///
/// `]]` is an escaped `]`. For the unsupported forms (a nested `[`, a line
/// break, no closing bracket) returns the index where scanning may resume.
fn read_bracketed(chars: &[char], start: usize) -> Result<(String, usize), usize> {
    let mut name = String::new();
    let mut supported = true;
    let mut i = start + 1;
    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            (']', Some(']')) => {
                name.push(']');
                i += 2;
            }
            (']', _) if supported => return Ok((name, i + 1)),
            (']', _) => return Err(i + 1),
            ('\n' | '\r', _) => return Err(i),
            ('[', _) => {
                supported = false;
                i += 1;
            }
            (c, _) => {
                name.push(c);
                i += 1;
            }
        }
    }
    Err(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_comment_is_removed() {
        let clean = strip_noise("SELECT 1 -- FROM Fake.Table\nFROM Real.Table");
        assert!(!clean.text().contains("Fake"));
        assert!(clean.text().contains("Real.Table"));
    }

    #[test]
    fn nested_block_comment_is_removed() {
        let clean = strip_noise("a /* x /* FROM Fake.T */ still comment */ b");
        assert_eq!(clean.text(), "a   b");
    }

    #[test]
    fn literals_with_escaped_quotes_are_removed() {
        let clean = strip_noise("x = 'it''s FROM Fake.T' AND \"col \"\" name\" = 1");
        assert_eq!(clean.text(), "x =   AND   = 1");
    }

    #[test]
    fn bracketed_names_are_parked() {
        let clean = strip_noise("FROM [My Module].[My-Entity]");
        assert_eq!(clean.text(), "FROM __bracketed_0__.__bracketed_1__");
        assert_eq!(clean.decode("__bracketed_0__"), "My Module");
        assert_eq!(clean.decode("__bracketed_1__"), "My-Entity");
    }

    #[test]
    fn doubled_closing_bracket_is_an_escape() {
        let clean = strip_noise("[a]]b]");
        assert_eq!(clean.decode("__bracketed_0__"), "a]b");
    }

    #[test]
    fn unsupported_bracket_forms_are_blanked() {
        let clean = strip_noise("FROM [a[b].c");
        assert!(!clean.text().contains("__bracketed_"));
    }

    #[test]
    fn unterminated_constructs_do_not_panic() {
        for sql in ["'open", "\"open", "/* open", "[open", "--"] {
            let _ = strip_noise(sql);
        }
    }

    #[test]
    fn plain_words_decode_to_themselves() {
        let clean = strip_noise("x");
        assert_eq!(clean.decode("Invoice"), "Invoice");
        assert_eq!(clean.decode("__bracketed_9__"), "__bracketed_9__");
    }
}
