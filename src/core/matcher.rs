//! Text matching for restaurant and item search.
//!
//! User text is treated as pattern source, so every search goes through
//! [`TokenPatterns::parse`] first: it bounds the input length and token
//! count, and every compiled pattern carries a size limit. Tokens that do
//! not parse as patterns fall back to literal matching.

use crate::domain::model::Restaurant;
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::validate_search_text;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub max_query_length: usize,
    pub max_tokens: usize,
    pub regex_size_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_query_length: 128,
            max_tokens: 8,
            regex_size_limit: 64 * 1024,
        }
    }
}

/// Case-insensitive, size-bounded compile. Invalid pattern source is
/// retried as an escaped literal.
pub fn compile_pattern(source: &str, size_limit: usize) -> Result<Regex> {
    build(source, size_limit).or_else(|_| build(&regex::escape(source), size_limit))
}

fn build(source: &str, size_limit: usize) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
        .map_err(|e| DiscoveryError::validation("search_string", source, e.to_string()))
}

#[derive(Debug, Clone)]
pub struct TokenPatterns {
    text: String,
    tokens: Vec<String>,
    size_limit: usize,
}

impl TokenPatterns {
    pub fn parse(text: &str, limits: &SearchLimits) -> Result<Self> {
        let text = validate_search_text(text, limits.max_query_length, limits.max_tokens)?;
        Ok(Self {
            text: text.to_string(),
            tokens: text.split_whitespace().map(str::to_string).collect(),
            size_limit: limits.regex_size_limit,
        })
    }

    /// The whole trimmed search text, used for exact matching.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The whole text as one case-insensitive pattern.
    pub fn whole_pattern(&self) -> Result<Regex> {
        compile_pattern(&self.text, self.size_limit)
    }

    /// One pattern per token. Attribute queries need all of them to match,
    /// item-name queries any one.
    pub fn per_token_patterns(&self) -> Result<Vec<Regex>> {
        self.tokens
            .iter()
            .map(|t| compile_pattern(t, self.size_limit))
            .collect()
    }
}

pub fn matches_exact(candidate: &str, text: &str) -> bool {
    candidate == text
}

/// Every pattern has to hit at least one attribute.
pub fn all_patterns_match_attributes(attributes: &[String], patterns: &[Regex]) -> bool {
    patterns
        .iter()
        .all(|p| attributes.iter().any(|a| p.is_match(a)))
}

/// Keeps the first occurrence of each restaurant id, in arrival order.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    restaurants: Vec<Restaurant>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, restaurant: Restaurant) -> bool {
        if self.seen.insert(restaurant.restaurant_id.clone()) {
            self.restaurants.push(restaurant);
            true
        } else {
            false
        }
    }

    pub fn extend<I: IntoIterator<Item = Restaurant>>(&mut self, restaurants: I) {
        for restaurant in restaurants {
            self.push(restaurant);
        }
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn into_vec(self) -> Vec<Restaurant> {
        self.restaurants
    }
}
