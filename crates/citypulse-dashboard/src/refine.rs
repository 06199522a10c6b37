//! Pure post-fetch refinement: filter, rank, de-duplicate, truncate.

use std::collections::HashSet;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Score<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;
type Key<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// How retained items are ordered.
pub enum Ranking<T> {
    /// Keep the provider's order.
    ProviderOrder,
    /// Highest score first; ties keep provider order.
    Descending(Score<T>),
}

/// Items that survived refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct Refined<T> {
    pub items: Vec<T>,
    /// How many items passed the filter before truncation.
    pub matched: usize,
}

impl<T> Refined<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// A refinement recipe: predicate, ranking, optional de-duplication key and limit.
///
/// Applying a policy never performs I/O and never fails; an input with no
/// survivors yields an empty result.
pub struct RefinementPolicy<T> {
    name: &'static str,
    predicate: Option<Predicate<T>>,
    ranking: Ranking<T>,
    dedup_key: Option<Key<T>>,
    limit: usize,
}

impl<T> RefinementPolicy<T> {
    pub fn new(name: &'static str, limit: usize) -> Self {
        Self {
            name,
            predicate: None,
            ranking: Ranking::ProviderOrder,
            dedup_key: None,
            limit,
        }
    }

    pub fn keep_if(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn rank_by(mut self, score: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        self.ranking = Ranking::Descending(Box::new(score));
        self
    }

    pub fn dedup_by(mut self, key: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.dedup_key = Some(Box::new(key));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn apply(&self, items: Vec<T>) -> Refined<T> {
        let received = items.len();
        let mut kept: Vec<T> = match &self.predicate {
            Some(predicate) => items.into_iter().filter(|item| predicate(item)).collect(),
            None => items,
        };

        if let Ranking::Descending(score) = &self.ranking {
            let mut scored: Vec<(f64, T)> = kept
                .into_iter()
                .map(|item| (score(&item), item))
                .collect();
            // sort_by is stable, so equal scores keep provider order.
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            kept = scored.into_iter().map(|(_, item)| item).collect();
        }

        if let Some(key) = &self.dedup_key {
            let mut seen = HashSet::new();
            kept.retain(|item| seen.insert(key(item)));
        }

        let matched = kept.len();
        kept.truncate(self.limit);

        tracing::trace!(
            "{} refinement: {} received, {} matched, {} kept",
            self.name,
            received,
            matched,
            kept.len()
        );

        Refined {
            items: kept,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rank_truncate() {
        let policy = RefinementPolicy::new("numbers", 2)
            .keep_if(|n: &i32| n % 2 == 0)
            .rank_by(|n| f64::from(*n));

        let refined = policy.apply(vec![1, 4, 2, 8, 6, 3]);
        assert_eq!(refined.items, vec![8, 6]);
        assert_eq!(refined.matched, 4);
    }

    #[test]
    fn test_provider_order_is_preserved() {
        let policy = RefinementPolicy::new("words", 10).keep_if(|w: &&str| w.len() > 1);
        let refined = policy.apply(vec!["bb", "a", "dd", "cc"]);
        assert_eq!(refined.items, vec!["bb", "dd", "cc"]);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let policy = RefinementPolicy::new("pairs", 10).rank_by(|p: &(u8, char)| f64::from(p.0));
        let refined = policy.apply(vec![(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd')]);
        assert_eq!(refined.items, vec![(2, 'b'), (2, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn test_dedup_keeps_first_ranked() {
        let policy = RefinementPolicy::new("dedup", 10)
            .rank_by(|p: &(&str, u8)| f64::from(p.1))
            .dedup_by(|p| p.0.to_string());
        let refined = policy.apply(vec![("x", 1), ("y", 5), ("x", 9)]);
        assert_eq!(refined.items, vec![("x", 9), ("y", 5)]);
        assert_eq!(refined.matched, 2);
    }

    #[test]
    fn test_empty_input() {
        let policy: RefinementPolicy<i32> = RefinementPolicy::new("empty", 3);
        let refined = policy.apply(Vec::new());
        assert!(refined.is_empty());
        assert_eq!(refined.matched, 0);
    }

    #[test]
    fn test_zero_limit() {
        let policy = RefinementPolicy::new("none", 0);
        let refined = policy.apply(vec![1, 2, 3]);
        assert!(refined.is_empty());
        assert_eq!(refined.matched, 3);
    }
}
