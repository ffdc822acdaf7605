//! The expect pattern race.

use regex::bytes::Regex;

/// A winning pattern: which alternative matched and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternHit {
    /// Index of the winning pattern in the list passed to [`earliest_match`].
    pub index: usize,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset one past the end of the match.
    pub end: usize,
}

/// Race a list of patterns over a haystack.
///
/// Every pattern searches the whole haystack; the match starting earliest
/// wins. Ties at the same offset go to the pattern listed first, which is how
/// callers express priority between overlapping alternatives.
pub fn earliest_match(patterns: &[&Regex], haystack: &[u8]) -> Option<PatternHit> {
    let mut best: Option<PatternHit> = None;

    for (index, pattern) in patterns.iter().enumerate() {
        if let Some(m) = pattern.find(haystack) {
            let earlier = best.map_or(true, |b| m.start() < b.start);
            if earlier {
                best = Some(PatternHit {
                    index,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
    }

    best
}
