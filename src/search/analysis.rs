//! Text analysis shared by indexing and querying: tokenization, query-syntax
//! escaping, and the small query grammar understood by the index.
//!
//! Words are found with Unicode (UAX #29) word boundaries and lowercased, so
//! `get_weather`, `don't` and `3.14` each stay one term and combining marks
//! stay attached to their base letter. The colon, a word-joiner in UAX #29,
//! is tailored to a separator since it is field syntax in queries.
//! Ideographs are then split into single-character terms. No stemming is
//! applied, on either side.

use crate::error::{Result, ScopeError};
use unicode_segmentation::UnicodeSegmentation;

/// Characters with meaning in the query grammar. Only `:` (field restriction)
/// and `\` (escape) are interpreted; the rest act as separators, but all of
/// them are escaped so callers can never reach syntax by accident.
pub const QUERY_METACHARACTERS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    '/',
];

/// Characters indexed one per term: Hiragana (U+3040..U+309F), CJK Unified
/// Ideographs with Extension A (U+3400..U+4DBF, U+4E00..U+9FFF), CJK
/// Compatibility Ideographs (U+F900..U+FAFF), and the supplementary
/// ideographic planes covering Extensions B to I plus the compatibility
/// supplement (U+20000..U+2FA1F, U+30000..U+323AF).
///
/// Hangul and Katakana are not listed: word boundaries already keep their
/// runs together as whole words.
fn is_ideographic(ch: char) -> bool {
    matches!(ch as u32,
        0x3040..=0x309F
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x2_0000..=0x2_FA1F
        | 0x3_0000..=0x3_23AF
    )
}

/// Split `text` into lowercase terms.
pub fn analyze(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(':').flat_map(|part| part.unicode_words()) {
        if !word.chars().any(is_ideographic) {
            tokens.push(word.to_lowercase());
            continue;
        }
        let mut rest = String::new();
        for ch in word.chars() {
            if is_ideographic(ch) {
                if !rest.is_empty() {
                    tokens.push(rest.to_lowercase());
                    rest.clear();
                }
                tokens.push(ch.to_string());
            } else {
                rest.push(ch);
            }
        }
        if !rest.is_empty() {
            tokens.push(rest.to_lowercase());
        }
    }
    tokens
}

/// Prefix every query metacharacter with a backslash.
pub fn escape_query(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if QUERY_METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// One term to look up, optionally restricted to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClause {
    pub field: Option<String>,
    pub term: String,
}

/// Parse `query` into term clauses.
///
/// `field:word` restricts the terms of `word` to `field` when `field` is one
/// of `fields`; any other unescaped metacharacter separates words. Escaped
/// characters are taken literally. A trailing lone backslash is a parse
/// error.
pub fn parse_query(query: &str, fields: &[&str]) -> Result<Vec<QueryClause>> {
    let mut clauses = Vec::new();
    let mut word = String::new();
    let mut pending_field: Option<String> = None;
    let mut chars = query.chars();

    let mut flush = |word: &mut String, field: &mut Option<String>| {
        if word.is_empty() {
            return;
        }
        for term in analyze(word) {
            clauses.push(QueryClause {
                field: field.clone(),
                term,
            });
        }
        word.clear();
        *field = None;
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => word.push(escaped),
                None => {
                    return Err(ScopeError::InternalSearch(format!(
                        "Cannot parse query '{}': trailing escape character",
                        query
                    )));
                }
            },
            ':' => {
                let candidate = word.to_lowercase();
                if fields.contains(&candidate.as_str()) {
                    word.clear();
                    pending_field = Some(candidate);
                } else {
                    flush(&mut word, &mut pending_field);
                }
            }
            c if c.is_whitespace() || QUERY_METACHARACTERS.contains(&c) => {
                flush(&mut word, &mut pending_field);
            }
            c => word.push(c),
        }
    }
    flush(&mut word, &mut pending_field);
    drop(flush);

    Ok(clauses)
}
