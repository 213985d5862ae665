//! Approximate name matching for page-embedded options.
//!
//! A candidate's score is the fewest edits needed to turn the query into some
//! substring of its name, divided by the query length, plus a small penalty
//! for how far into the name that substring starts. Lower is better; anything
//! above the threshold is dropped. This tolerates typos and partial words
//! ("digtal sig") while rejecting scrambled letters.

use crate::FilterOption;
use std::cmp::Ordering;

/// How far into a name a match may start before it costs a full error.
const LOCATION_DISTANCE: f64 = 100.0;

/// What an empty query returns. Pages disagree on this, so it is configured
/// per filter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQueryPolicy {
    #[default]
    ShowAll,
    ShowNone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatcher {
    options: Vec<FilterOption>,
    index: Vec<Vec<char>>,
    threshold: f64,
    empty_query: EmptyQueryPolicy,
}

struct Scored {
    position: usize,
    score: f64,
    exact: bool,
    similarity: f64,
}

impl FuzzyMatcher {
    pub fn new(options: Vec<FilterOption>, threshold: f64, empty_query: EmptyQueryPolicy) -> Self {
        let index = build_index(&options);
        Self {
            options,
            index,
            threshold,
            empty_query,
        }
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn get(&self, id: &str) -> Option<&FilterOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn empty_query(&self) -> EmptyQueryPolicy {
        self.empty_query
    }

    /// Replace the candidate list and rebuild the index.
    pub fn set_options(&mut self, options: Vec<FilterOption>) {
        self.index = build_index(&options);
        self.options = options;
    }

    /// Matching options, best first.
    pub fn search(&self, query: &str) -> Vec<&FilterOption> {
        let query = query.trim();
        if query.is_empty() {
            return match self.empty_query {
                EmptyQueryPolicy::ShowAll => self.options.iter().collect(),
                EmptyQueryPolicy::ShowNone => Vec::new(),
            };
        }

        let pattern: Vec<char> = query.to_lowercase().chars().collect();
        let lowered = query.to_lowercase();
        let mut scored: Vec<Scored> = self
            .index
            .iter()
            .enumerate()
            .filter_map(|(position, name)| {
                let score = substring_score(&pattern, name)?;
                if score > self.threshold {
                    return None;
                }
                let name: String = name.iter().collect();
                Some(Scored {
                    position,
                    score,
                    exact: name == lowered,
                    similarity: strsim::normalized_levenshtein(&lowered, &name),
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.exact.cmp(&a.exact))
                .then_with(|| {
                    b.similarity
                        .partial_cmp(&a.similarity)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.position.cmp(&b.position))
        });

        scored.iter().map(|s| &self.options[s.position]).collect()
    }
}

fn build_index(options: &[FilterOption]) -> Vec<Vec<char>> {
    options
        .iter()
        .map(|o| o.name.to_lowercase().chars().collect())
        .collect()
}

/// Best `errors / pattern_len + start / LOCATION_DISTANCE` over all substrings
/// of `text`, or `None` for an empty pattern.
fn substring_score(pattern: &[char], text: &[char]) -> Option<f64> {
    if pattern.is_empty() {
        return None;
    }
    let m = pattern.len();

    // Column-wise edit distance where the match may start anywhere in `text`.
    // Each cell carries the distance and the text offset the match began at.
    let mut prev: Vec<(usize, usize)> = (0..=m).map(|i| (i, 0)).collect();
    let mut best = score_of(prev[m], m);

    for (j, &tc) in text.iter().enumerate() {
        let mut cur = vec![(0, j + 1); m + 1];
        for i in 1..=m {
            let substitute = (
                prev[i - 1].0 + usize::from(pattern[i - 1] != tc),
                prev[i - 1].1,
            );
            let skip_text = (prev[i].0 + 1, prev[i].1);
            let skip_pattern = (cur[i - 1].0 + 1, cur[i - 1].1);
            cur[i] = [substitute, skip_text, skip_pattern]
                .into_iter()
                .min_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
                .unwrap_or(substitute);
        }
        best = best.min(score_of(cur[m], m));
        prev = cur;
    }
    Some(best)
}

fn score_of((errors, start): (usize, usize), pattern_len: usize) -> f64 {
    errors as f64 / pattern_len as f64 + start as f64 / LOCATION_DISTANCE
}
