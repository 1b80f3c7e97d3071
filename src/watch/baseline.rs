//! # Edge detection against a remembered baseline.
//!
//! [`Baselines`] keeps the last observed value per key. The first observation
//! of a key only records it; later ones hand `(previous, current)` to a
//! classifier when the value changed.

use std::collections::HashMap;

/// Last known value of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline<V> {
    /// Nothing observed yet.
    Unsampled,
    /// Last observed value.
    Sampled(V),
}

/// Per-key baselines owned by one watcher loop.
#[derive(Debug)]
pub struct Baselines<V> {
    values: HashMap<String, Baseline<V>>,
}

impl<V> Default for Baselines<V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<V: Clone + PartialEq> Baselines<V> {
    /// Creates an empty set (every key unsampled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the baseline of `key`.
    pub fn get(&self, key: &str) -> Baseline<V> {
        self.values.get(key).cloned().unwrap_or(Baseline::Unsampled)
    }

    /// Records `current` for `key` and returns what `classify` made of the change.
    ///
    /// - unsampled → store, `None`
    /// - changed → `classify(prev, current)`, store
    /// - unchanged → `None`
    pub fn observe<T>(
        &mut self,
        key: &str,
        current: V,
        classify: impl FnOnce(&V, &V) -> Option<T>,
    ) -> Option<T> {
        match self.values.get_mut(key) {
            None | Some(Baseline::Unsampled) => {
                self.values.insert(key.to_string(), Baseline::Sampled(current));
                None
            }
            Some(Baseline::Sampled(prev)) => {
                if *prev == current {
                    return None;
                }
                let out = classify(prev, &current);
                *prev = current;
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_change(prev: &i64, cur: &i64) -> Option<String> {
        Some(format!("{prev}->{cur}"))
    }

    #[test]
    fn first_sample_is_silent() {
        let mut b = Baselines::new();
        assert_eq!(b.get("k"), Baseline::Unsampled);
        assert_eq!(b.observe("k", 5, any_change), None);
        assert_eq!(b.get("k"), Baseline::Sampled(5));
    }

    #[test]
    fn changes_are_classified_and_stored() {
        let mut b = Baselines::new();
        b.observe("k", 1, any_change);
        assert_eq!(b.observe("k", 1, any_change), None);
        assert_eq!(b.observe("k", 2, any_change), Some("1->2".to_string()));
        assert_eq!(b.get("k"), Baseline::Sampled(2));
    }

    #[test]
    fn quiet_changes_still_move_the_baseline() {
        let mut b = Baselines::new();
        b.observe("k", 3, |_: &i64, _: &i64| None::<()>);
        assert_eq!(b.observe("k", 4, |_, _| None::<()>), None);
        assert_eq!(b.get("k"), Baseline::Sampled(4));
    }

    #[test]
    fn keys_are_independent() {
        let mut b = Baselines::new();
        b.observe("a", 1, any_change);
        assert_eq!(b.observe("b", 9, any_change), None);
        assert_eq!(b.observe("a", 2, any_change), Some("1->2".to_string()));
    }
}
