//! Approximate substring similarity.

/// Similarity of the shorter string to the best-matching part of the longer
/// one, on a 0 to 100 scale.
///
/// Convenience wrapper around [`Matcher::partial_ratio`] for one-off calls.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    Matcher::default().partial_ratio(a, b)
}

/// Reusable scratch space for [`Matcher::partial_ratio`].
///
/// Searching scores many fields in a row; keeping one `Matcher` around
/// avoids allocating DP rows for each of them.
#[derive(Debug, Default)]
pub struct Matcher {
    short: Vec<char>,
    prev2: Vec<usize>,
    prev: Vec<usize>,
    curr: Vec<usize>,
}

impl Matcher {
    /// Edit distance between the shorter string and its closest substring
    /// of the longer one, mapped to 0 to 100.
    ///
    /// Insertions, deletions, substitutions and adjacent transpositions cost
    /// one each. The substring may start and end anywhere, so an exact
    /// substring scores 100 and every edit costs `100 / len(shorter)`.
    /// Runs in `O(len(a) * len(b))` with no per-call allocation once the
    /// buffers have grown. Comparison is case-sensitive; callers lowercase
    /// both sides.
    pub fn partial_ratio(&mut self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let (short, long) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };

        self.short.clear();
        self.short.extend(short.chars());
        let n = self.short.len();
        for row in [&mut self.prev2, &mut self.prev, &mut self.curr] {
            row.clear();
            row.extend(0..=n);
        }

        let mut best = n;
        let mut last: Option<char> = None;
        for c in long.chars() {
            // Column 0 is zero on every row: the match may start anywhere.
            self.curr[0] = 0;
            for i in 1..=n {
                let s = self.short[i - 1];
                let cost = usize::from(s != c);
                let mut d = (self.prev[i - 1] + cost)
                    .min(self.prev[i] + 1)
                    .min(self.curr[i - 1] + 1);
                if i >= 2 && last == Some(s) && self.short[i - 2] == c {
                    d = d.min(self.prev2[i - 2] + 1);
                }
                self.curr[i] = d;
            }

            best = best.min(self.curr[n]);
            if best == 0 {
                break;
            }
            last = Some(c);
            std::mem::swap(&mut self.prev2, &mut self.prev);
            std::mem::swap(&mut self.prev, &mut self.curr);
        }

        (1.0 - best as f64 / n as f64) * 100.0
    }
}
