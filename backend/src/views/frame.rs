//! Table primitives the view recipes are built from.
//!
//! Grouping keeps a deterministic group order (first occurrence, or key
//! ascending with missing keys last) so that a later stable sort breaks
//! ties the same way on every call.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// How groups are ordered before any metric sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Order of first appearance in the input (value counts).
    FirstSeen,
    /// Key ascending, missing keys last (group-by).
    KeyAscending,
}

/// A key that can be ordered with missing values last.
pub trait GroupKey: Eq + Hash + Clone {
    fn key_cmp(&self, other: &Self) -> Ordering;
}

impl GroupKey for Option<&str> {
    fn key_cmp(&self, other: &Self) -> Ordering {
        cmp_nulls_last(*self, *other)
    }
}

impl GroupKey for (Option<&str>, Option<&str>) {
    fn key_cmp(&self, other: &Self) -> Ordering {
        cmp_nulls_last(self.0, other.0).then_with(|| cmp_nulls_last(self.1, other.1))
    }
}

/// Ascending string order with `None` after every value.
pub fn cmp_nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Running row count, sum and non-missing count for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub rows: u64,
    pub sum: f64,
    pub values: u64,
}

impl Accumulator {
    pub fn push(&mut self, value: Option<f64>) {
        self.rows += 1;
        if let Some(v) = value {
            self.sum += v;
            self.values += 1;
        }
    }

    /// Mean over non-missing values; `None` when there were none.
    pub fn mean(&self) -> Option<f64> {
        (self.values > 0).then(|| self.sum / self.values as f64)
    }
}

/// Group `(key, value)` pairs and accumulate each group.
pub fn group_by<K, I>(items: I, order: GroupOrder) -> Vec<(K, Accumulator)>
where
    K: GroupKey,
    I: IntoIterator<Item = (K, Option<f64>)>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Accumulator)> = Vec::new();

    for (key, value) in items {
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.push(value);
    }

    if order == GroupOrder::KeyAscending {
        groups.sort_by(|a, b| a.0.key_cmp(&b.0));
    }
    groups
}

/// Count rows per key, most frequent first.
///
/// Ties keep first-occurrence order.
pub fn value_counts<'a, I>(keys: I) -> Vec<(Option<&'a str>, u64)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: Vec<(Option<&'a str>, u64)> =
        group_by(keys.into_iter().map(|k| (k, None)), GroupOrder::FirstSeen)
            .into_iter()
            .map(|(key, acc)| (key, acc.rows))
            .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Descending order for optional amounts, missing last.
pub fn cmp_amount_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Split each cell on `separator`, yielding one `(row, token)` per token.
///
/// Lazy; tokens are not trimmed and empty tokens are kept.
pub fn explode<'a, I>(cells: I, separator: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a
where
    I: IntoIterator<Item = (usize, &'a str)>,
    I::IntoIter: 'a,
{
    cells
        .into_iter()
        .flat_map(move |(row, cell)| cell.split(separator).map(move |token| (row, token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_pairs_tokens_with_rows() {
        let cells = vec![(0, "North Indian, Chinese"), (2, "Cafe")];
        let tokens: Vec<_> = explode(cells, ", ").collect();
        assert_eq!(
            tokens,
            vec![(0, "North Indian"), (0, "Chinese"), (2, "Cafe")]
        );
    }

    #[test]
    fn test_explode_keeps_untrimmed_tokens() {
        let tokens: Vec<_> = explode(vec![(0, "Pizza,Cafe, ")], ", ").collect();
        assert_eq!(tokens, vec![(0, "Pizza,Cafe"), (0, "")]);
    }

    #[test]
    fn test_group_by_key_ascending_nulls_last() {
        let items = vec![
            (Some("b"), Some(1.0)),
            (None, Some(5.0)),
            (Some("a"), None),
            (Some("b"), Some(3.0)),
        ];
        let groups = group_by(items, GroupOrder::KeyAscending);
        let keys: Vec<_> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![Some("a"), Some("b"), None]);

        let b = &groups[1].1;
        assert_eq!(b.rows, 2);
        assert_eq!(b.sum, 4.0);
        assert_eq!(b.mean(), Some(2.0));
        assert_eq!(groups[0].1.mean(), None);
    }

    #[test]
    fn test_value_counts_ties_keep_first_seen() {
        let counts = value_counts(vec![Some("x"), Some("y"), Some("y"), Some("z"), Some("x")]);
        assert_eq!(counts, vec![(Some("x"), 2), (Some("y"), 2), (Some("z"), 1)]);
    }

    #[test]
    fn test_missing_key_is_its_own_group() {
        let counts = value_counts(vec![None, Some("a"), None]);
        assert_eq!(counts, vec![(None, 2), (Some("a"), 1)]);
    }

    #[test]
    fn test_amount_desc_puts_missing_last() {
        let mut values = vec![Some(1.0), None, Some(3.0)];
        values.sort_by(|a, b| cmp_amount_desc(*a, *b));
        assert_eq!(values, vec![Some(3.0), Some(1.0), None]);
    }
}
