//! Token-set similarity scoring

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static TERM_RE: OnceLock<Regex> = OnceLock::new();

/// Jaccard index over lowercase whitespace tokens, in [0, 1].
///
/// Used by streak compression. An empty union (both strings blank) scores 0.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    jaccard_sets(&lowercase(&set_a), &lowercase(&set_b))
}

fn lowercase(tokens: &HashSet<&str>) -> HashSet<String> {
    tokens.iter().map(|t| t.to_lowercase()).collect()
}

fn jaccard_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Lowercased alphanumeric terms, punctuation stripped.
///
/// Used by the search ranker only; compression keeps its whitespace
/// tokenization above. The two schemes are deliberately separate.
pub fn tokenize_terms(text: &str) -> Vec<String> {
    let re = TERM_RE.get_or_init(|| Regex::new(r"[a-z0-9]+").unwrap());
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
