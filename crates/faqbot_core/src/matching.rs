use crate::model::{Decision, FaqEntry, MatchResult};
use crate::similarity::token_sort_ratio;

pub const DEFAULT_THRESHOLD: u8 = 60;

/// Highest-scoring entry; the first one wins ties. `None` when no entry
/// scores above zero.
pub fn top_match<'a>(query: &str, entries: &'a [FaqEntry]) -> Option<(&'a FaqEntry, u8)> {
    let query = query.to_lowercase();
    let mut best: Option<(&FaqEntry, u8)> = None;

    for entry in entries {
        let score = token_sort_ratio(&query, &entry.question.to_lowercase());
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((entry, score));
        }
    }

    best
}

pub fn find_best_match(query: &str, entries: &[FaqEntry], threshold: u8) -> MatchResult {
    let result = match top_match(query, entries) {
        Some((entry, score)) if score >= threshold => MatchResult {
            answer: Some(entry.answer.clone()),
            category: Some(entry.category.clone()),
            question: Some(entry.question.clone()),
            score,
            decision: Decision::Hit,
        },
        Some((entry, score)) => MatchResult {
            answer: None,
            category: None,
            question: Some(entry.question.clone()),
            score,
            decision: Decision::Miss,
        },
        None => MatchResult {
            answer: None,
            category: None,
            question: None,
            score: 0,
            decision: Decision::Miss,
        },
    };

    tracing::debug!(
        score = result.score,
        threshold,
        decision = ?result.decision,
        scanned = entries.len(),
        "faq match"
    );
    result
}
