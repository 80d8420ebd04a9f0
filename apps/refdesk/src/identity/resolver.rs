//! Identity Resolver — matches a query key (derived from a résumé filename)
//! against the identity keys of known conversations.
//!
//! Tiers are tried in order and the first tier with a match wins:
//!
//! 1. `Exact`           — byte-for-byte equal keys
//! 2. `CaseInsensitive` — equal after `normalize` (case and separators)
//! 3. `Containment`     — one normalized key contains the other; best token-overlap ratio
//! 4. `TokenOverlap`    — most shared tokens, at least `min(2, |q|, |c|)` of them
//! 5. `FirstToken`      — the query's first token is a token of the candidate
//!
//! Ties always go to the candidate inserted first, so the result is
//! deterministic for a given candidate ordering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::identity::{first_token, normalize, tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    Containment,
    TokenOverlap,
    FirstToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Index into the candidate list.
    pub index: usize,
    pub tier: MatchTier,
}

type Tier = fn(&str, &[&str]) -> Option<usize>;

const TIERS: &[(MatchTier, Tier)] = &[
    (MatchTier::Exact, exact_match),
    (MatchTier::CaseInsensitive, case_insensitive_match),
    (MatchTier::Containment, containment_match),
    (MatchTier::TokenOverlap, token_overlap_match),
    (MatchTier::FirstToken, first_token_match),
];

/// Runs the cascade. `None` means the identity is unresolved.
pub fn resolve(query: &str, candidates: &[&str]) -> Option<Resolution> {
    if query.trim().is_empty() {
        return None;
    }
    TIERS.iter().find_map(|(tier, matcher)| {
        matcher(query, candidates).map(|index| Resolution { index, tier: *tier })
    })
}

pub fn exact_match(query: &str, candidates: &[&str]) -> Option<usize> {
    candidates.iter().position(|c| *c == query)
}

pub fn case_insensitive_match(query: &str, candidates: &[&str]) -> Option<usize> {
    let query = normalize(query);
    candidates.iter().position(|c| normalize(c) == query)
}

pub fn containment_match(query: &str, candidates: &[&str]) -> Option<usize> {
    let normalized_query = normalize(query);
    if normalized_query.is_empty() {
        return None;
    }
    let query_tokens = token_set(query);

    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let normalized = normalize(candidate);
        if normalized.is_empty() {
            continue;
        }
        if !normalized_query.contains(&normalized) && !normalized.contains(&normalized_query) {
            continue;
        }
        let candidate_tokens = token_set(candidate);
        let shared = query_tokens.intersection(&candidate_tokens).count();
        let denominator = query_tokens.len().max(candidate_tokens.len()).max(1);
        let score = shared as f64 / denominator as f64;
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

pub fn token_overlap_match(query: &str, candidates: &[&str]) -> Option<usize> {
    let query_tokens = token_set(query);
    if query_tokens.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let candidate_tokens = token_set(candidate);
        let shared = query_tokens.intersection(&candidate_tokens).count();
        // A single shared surname between two multi-token names is not enough.
        let quorum = 2.min(query_tokens.len()).min(candidate_tokens.len());
        if shared == 0 || shared < quorum {
            continue;
        }
        if best.map_or(true, |(_, top)| shared > top) {
            best = Some((index, shared));
        }
    }
    best.map(|(index, _)| index)
}

pub fn first_token_match(query: &str, candidates: &[&str]) -> Option<usize> {
    let first = first_token(query)?;
    candidates
        .iter()
        .position(|candidate| tokens(candidate).iter().any(|t| *t == first))
}

fn token_set(key: &str) -> HashSet<String> {
    tokens(key).into_iter().collect()
}

/// Ordered identity-key → payload mapping. Insertion order is the tie-break
/// order for every tier; inserting an existing key merges into its payload.
#[derive(Debug, Clone)]
pub struct CandidateSet<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for CandidateSet<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> CandidateSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `payload` under `key`, or hands the existing payload to `merge`.
    pub fn upsert_with(&mut self, key: String, payload: T, merge: impl FnOnce(&mut T, T)) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => merge(existing, payload),
            None => self.entries.push((key, payload)),
        }
    }

    #[cfg(test)]
    pub fn insert(&mut self, key: String, payload: T) {
        self.upsert_with(key, payload, |existing, new| *existing = new);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Resolves `query` and returns the matched key, its payload and the tier.
    pub fn resolve(&self, query: &str) -> Option<(&str, &T, MatchTier)> {
        let keys: Vec<&str> = self.keys().collect();
        let resolution = resolve(query, &keys)?;
        let (key, payload) = &self.entries[resolution.index];
        Some((key.as_str(), payload, resolution.tier))
    }
}
