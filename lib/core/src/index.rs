//! Exact nearest-neighbor search over a flat list of vectors.
//!
//! The index is built once from an ordered batch and never mutated
//! afterwards. Search is a brute-force scan using squared L2 distance, so
//! results match a flat FAISS-style L2 index exactly.

use crate::{Error, Result, Vector};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One search hit: the insertion position of the vector and its squared L2
/// distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Heap entry ordered by (distance, position) so the heap top is the worst
/// hit kept so far. Ties on distance keep the lower position.
#[derive(Clone, Copy)]
struct Candidate {
    position: usize,
    distance: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Immutable flat L2 index
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vector>,
}

impl FlatIndex {
    /// Build an index from an ordered batch of vectors.
    ///
    /// The first vector fixes the dimension. An empty batch, a zero-length
    /// vector, or any vector of a different length is rejected.
    pub fn build(vectors: Vec<Vector>) -> Result<Self> {
        let dim = vectors.first().map(Vector::dim).ok_or(Error::EmptyIndex)?;
        if dim == 0 {
            return Err(Error::InvalidDimension {
                expected: 1,
                actual: 0,
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }

        tracing::debug!(count = vectors.len(), dim, "built flat index");
        Ok(Self { dim, vectors })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, position: usize) -> Option<&Vector> {
        self.vectors.get(position)
    }

    /// Return the `min(k, len)` nearest vectors to `query`, closest first.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(Error::InvalidK);
        }
        if query.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let limit = k.min(self.vectors.len());
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(limit + 1);

        for (position, vector) in self.vectors.iter().enumerate() {
            let candidate = Candidate {
                position,
                distance: vector.squared_l2(query),
            };
            if heap.len() < limit {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                position: c.position,
                distance: c.distance,
            })
            .collect())
    }
}
