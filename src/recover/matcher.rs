//! Approximate string matching against a fixed candidate list.

/// Best-match-with-score over a candidate list.
pub trait Matcher {
    /// The best candidate for `query` and its similarity score in `0..=100`.
    ///
    /// Returns `None` only when `candidates` is empty.
    fn best_match<'c>(&self, query: &str, candidates: &'c [String]) -> Option<(&'c str, u8)>;
}

/// Indel-normalized similarity on case-folded alphanumerics.
///
/// Both strings are reduced to lower-case letters and digits, which absorbs
/// hyphenation breaks, stray punctuation, and merged whitespace. The score
/// is `100 · 2·LCS / (|a| + |b|)`, rounded. Ties go to the earliest
/// candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioMatcher;

impl RatioMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of two strings in `0..=100`.
    pub fn score(a: &str, b: &str) -> u8 {
        let a = normalize(a);
        let b = normalize(b);
        ratio(&a, &b)
    }
}

impl Matcher for RatioMatcher {
    fn best_match<'c>(&self, query: &str, candidates: &'c [String]) -> Option<(&'c str, u8)> {
        let query = normalize(query);
        let mut best: Option<(&'c str, u8)> = None;

        for candidate in candidates {
            let score = ratio(&query, &normalize(candidate));
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate.as_str(), score));
            }
        }

        best
    }
}

fn normalize(s: &str) -> Vec<char> {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn ratio(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let common = lcs_len(a, b);
    ((200 * common) as f64 / total as f64).round() as u8
}

/// Length of the longest common subsequence, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
