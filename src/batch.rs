//! Triple batches as parallel integer columns.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A batch of (head, relation, tail) triples stored as three parallel
/// columns of dense integer IDs.
///
/// Triples are immutable once formed; insertion order is preserved for
/// reproducibility but carries no semantic meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleBatch {
    heads: Vec<usize>,
    relations: Vec<usize>,
    tails: Vec<usize>,
}

impl TripleBatch {
    /// Build a batch from three parallel columns.
    ///
    /// Fails with [`Error::Shape`] when the columns have different lengths,
    /// i.e. the input does not form a `B x 3` table.
    pub fn from_columns(
        heads: Vec<usize>,
        relations: Vec<usize>,
        tails: Vec<usize>,
    ) -> Result<Self> {
        if heads.len() != relations.len() || heads.len() != tails.len() {
            return Err(Error::Shape {
                heads: heads.len(),
                relations: relations.len(),
                tails: tails.len(),
            });
        }
        Ok(Self {
            heads,
            relations,
            tails,
        })
    }

    /// Build a batch from (head, relation, tail) tuples.
    pub fn from_triples(triples: &[(usize, usize, usize)]) -> Self {
        let mut batch = Self::default();
        for &(h, r, t) in triples {
            batch.push(h, r, t);
        }
        batch
    }

    /// Append one triple.
    pub fn push(&mut self, head: usize, relation: usize, tail: usize) {
        self.heads.push(head);
        self.relations.push(relation);
        self.tails.push(tail);
    }

    /// Number of triples in the batch.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    /// Whether the batch holds no triples.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Head column.
    pub fn heads(&self) -> &[usize] {
        &self.heads
    }

    /// Relation column.
    pub fn relations(&self) -> &[usize] {
        &self.relations
    }

    /// Tail column.
    pub fn tails(&self) -> &[usize] {
        &self.tails
    }

    /// The i-th triple as a (head, relation, tail) tuple.
    pub fn get(&self, i: usize) -> (usize, usize, usize) {
        (self.heads[i], self.relations[i], self.tails[i])
    }

    /// Iterate over (head, relation, tail) tuples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.heads
            .iter()
            .zip(&self.relations)
            .zip(&self.tails)
            .map(|((&h, &r), &t)| (h, r, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns() {
        let batch = TripleBatch::from_columns(vec![0, 1], vec![0, 0], vec![1, 2]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(0), (0, 0, 1));
        assert_eq!(batch.get(1), (1, 0, 2));
    }

    #[test]
    fn test_from_columns_length_mismatch() {
        let err = TripleBatch::from_columns(vec![0, 1], vec![0], vec![1, 2]).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_from_triples_roundtrip() {
        let triples = [(0, 0, 1), (1, 0, 2), (2, 1, 0)];
        let batch = TripleBatch::from_triples(&triples);
        let collected: Vec<_> = batch.iter().collect();
        assert_eq!(collected, triples);
    }

    #[test]
    fn test_empty() {
        let batch = TripleBatch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
