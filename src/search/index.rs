//! Weighted multi-field inverted index with BM25 scoring.
//!
//! A [`LexicalIndex`] is immutable once built. Rebuilding produces a fresh
//! value which the [`LexicalToolSearcher`](super::searcher::LexicalToolSearcher)
//! publishes atomically together with the matching registry.

use crate::api::{
    DEFAULT_DESCRIPTION_BOOST, DEFAULT_NAME_BOOST, DEFAULT_PARAMETERS_BOOST, ToolSearchConfig,
    validate_boost,
};
use crate::error::{Result, ScopeError};
use crate::search::analysis::{QueryClause, analyze, escape_query, parse_query};
use crate::search::registry::IndexedTool;
use std::cmp::Ordering;
use std::collections::HashMap;

/// BM25 term-frequency saturation.
const K1: f64 = 1.2;
/// BM25 length normalization.
const B: f64 = 0.75;

/// Ordered list of indexed fields and their boosts.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoosts {
    fields: Vec<(String, f32)>,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            fields: vec![
                ("name".to_string(), DEFAULT_NAME_BOOST),
                ("description".to_string(), DEFAULT_DESCRIPTION_BOOST),
                ("parameters".to_string(), DEFAULT_PARAMETERS_BOOST),
            ],
        }
    }
}

impl FieldBoosts {
    /// An empty field set. At least one field must be added before use.
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn from_config(config: &ToolSearchConfig) -> Self {
        let mut boosts = Self {
            fields: vec![
                ("name".to_string(), config.name_boost),
                ("description".to_string(), config.description_boost),
                ("parameters".to_string(), config.parameters_boost),
            ],
        };
        for (field, boost) in &config.extra_fields {
            boosts.set(field, *boost);
        }
        boosts
    }

    /// Add `field`, or update its boost if already present.
    pub fn set(&mut self, field: &str, boost: f32) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = boost,
            None => self.fields.push((field.to_string(), boost)),
        }
    }

    pub fn boost(&self, field: &str) -> Option<f32> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, boost)| *boost)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ScopeError::Config(
                "At least one index field must be configured".to_string(),
            ));
        }
        for (field, boost) in &self.fields {
            validate_boost(field, *boost)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: u32,
    tf: u32,
}

#[derive(Debug)]
struct FieldIndex {
    name: String,
    boost: f64,
    postings: HashMap<String, Vec<Posting>>,
    lengths: Vec<u32>,
    avg_length: f64,
}

/// Immutable inverted index over a fixed, ordered set of tools.
///
/// Document ordinals are the positions of the tools passed to
/// [`build`](Self::build); they double as the insertion-order tie-break.
#[derive(Debug)]
pub struct LexicalIndex {
    fields: Vec<FieldIndex>,
    /// Documents containing each term in any indexed field.
    doc_freq: HashMap<String, u32>,
    doc_count: u32,
}

impl LexicalIndex {
    /// Analyze every configured field of every tool and build the postings.
    pub fn build(tools: &[IndexedTool], boosts: &FieldBoosts) -> Result<Self> {
        boosts.validate()?;
        let doc_count = u32::try_from(tools.len()).map_err(|_| {
            ScopeError::InternalSearch(format!("Too many documents to index: {}", tools.len()))
        })?;

        let mut doc_terms: Vec<std::collections::HashSet<String>> =
            vec![Default::default(); tools.len()];
        let mut fields = Vec::with_capacity(boosts.len());

        for (name, boost) in &boosts.fields {
            let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
            let mut lengths = Vec::with_capacity(tools.len());

            for (ordinal, tool) in tools.iter().enumerate() {
                let tokens = tool
                    .tool()
                    .index_field(name)
                    .map(|text| analyze(&text))
                    .unwrap_or_default();
                lengths.push(tokens.len() as u32);

                let mut frequencies: HashMap<String, u32> = HashMap::new();
                for token in tokens {
                    *frequencies.entry(token).or_insert(0) += 1;
                }
                for (term, tf) in frequencies {
                    doc_terms[ordinal].insert(term.clone());
                    postings.entry(term).or_default().push(Posting {
                        doc: ordinal as u32,
                        tf,
                    });
                }
            }

            let total: u64 = lengths.iter().map(|l| u64::from(*l)).sum();
            let avg_length = if tools.is_empty() {
                0.0
            } else {
                total as f64 / tools.len() as f64
            };

            fields.push(FieldIndex {
                name: name.clone(),
                boost: f64::from(*boost),
                postings,
                lengths,
                avg_length,
            });
        }

        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        for terms in doc_terms {
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        Ok(Self {
            fields,
            doc_freq,
            doc_count,
        })
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count as usize
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Escape `query_text`, parse it against the indexed fields, and return at
    /// most `k` `(ordinal, score)` pairs ordered by descending score, then
    /// ascending ordinal.
    pub fn search(&self, query_text: &str, k: usize) -> Vec<(usize, f64)> {
        if k == 0 {
            return Vec::new();
        }
        let escaped = escape_query(query_text);
        let clauses = match parse_query(&escaped, &self.field_names()) {
            Ok(clauses) => clauses,
            Err(e) => {
                tracing::error!(query = %query_text, error = %e, "Escaped query failed to parse");
                return Vec::new();
            }
        };
        self.search_clauses(&clauses, k)
    }

    /// Score pre-parsed clauses. Unlike [`search`](Self::search), clauses may
    /// carry field restrictions.
    pub fn search_clauses(&self, clauses: &[QueryClause], k: usize) -> Vec<(usize, f64)> {
        let mut scores = vec![0.0f64; self.doc_count as usize];
        let mut matched = vec![false; self.doc_count as usize];

        for clause in clauses {
            let Some(df) = self.doc_freq.get(&clause.term) else {
                continue;
            };
            let idf = self.idf(*df);
            for field in &self.fields {
                if clause
                    .field
                    .as_deref()
                    .is_some_and(|restricted| restricted != field.name)
                {
                    continue;
                }
                let Some(postings) = field.postings.get(&clause.term) else {
                    continue;
                };
                for posting in postings {
                    let doc = posting.doc as usize;
                    let tf = f64::from(posting.tf);
                    let length = f64::from(field.lengths[doc]);
                    let norm = if field.avg_length > 0.0 {
                        1.0 - B + B * length / field.avg_length
                    } else {
                        1.0
                    };
                    scores[doc] += field.boost * idf * (tf * (K1 + 1.0)) / (tf + K1 * norm);
                    matched[doc] = true;
                }
            }
        }

        let mut hits: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(doc, _)| matched[*doc])
            .collect();
        hits.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        hits.truncate(k);
        hits
    }

    fn idf(&self, df: u32) -> f64 {
        let n = f64::from(self.doc_count);
        let df = f64::from(df);
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}
