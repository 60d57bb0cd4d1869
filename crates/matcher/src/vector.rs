/// Sparse weighted-term vector keyed by vocabulary id.
///
/// Entries are kept sorted by term id, so dot products always sum in the
/// same order and repeated scoring is bit-for-bit identical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedTermVector {
    entries: Vec<(usize, f64)>,
    norm_sq: f64,
}

impl WeightedTermVector {
    /// Builds a vector from `(term_id, weight)` pairs. Ids may repeat and
    /// arrive in any order; repeated ids are summed and zero weights dropped.
    pub fn from_weights(weights: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = weights.into_iter().collect();
        entries.sort_by_key(|(id, _)| *id);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (id, weight) in entries {
            match merged.last_mut() {
                Some((last_id, last_weight)) if *last_id == id => *last_weight += weight,
                _ => merged.push((id, weight)),
            }
        }
        merged.retain(|(_, weight)| *weight != 0.0);

        let norm_sq = merged.iter().map(|(_, w)| w * w).sum();
        Self {
            entries: merged,
            norm_sq,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn weight(&self, term_id: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term_id, |(id, _)| *id)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub const fn norm_sq(&self) -> f64 {
        self.norm_sq
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.norm_sq == 0.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_id, a_w) = self.entries[i];
            let (b_id, b_w) = other.entries[j];
            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine of the angle between the two vectors; 0 when either has no magnitude.
    #[must_use]
    pub fn cosine(&self, other: &Self) -> f64 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        let score = self.dot(other) / (self.norm_sq * other.norm_sq).sqrt();
        score.clamp(0.0, 1.0)
    }
}
