use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Mul};

use crate::{Error, Result};

/// A dense vector of floating point numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// The origin of a `dim`-dimensional space
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|x| *x == 0.0)
    }

    /// Squared Euclidean distance, infinite on dimension mismatch
    #[inline]
    pub fn squared_l2(&self, other: &Vector) -> f32 {
        crate::simd::squared_l2_simd(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    /// Normalize the vector to unit length; the zero vector is left as is
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    /// Element-wise arithmetic mean of a non-empty set of equal-length vectors.
    pub fn mean(vectors: &[Vector]) -> Result<Vector> {
        let first = vectors.first().ok_or(Error::EmptyIndex)?;
        let mut sum = Vector::zeros(first.dim());
        for v in vectors {
            if v.dim() != sum.dim() {
                return Err(Error::InvalidDimension {
                    expected: sum.dim(),
                    actual: v.dim(),
                });
            }
            sum += v;
        }
        Ok(&sum * (1.0 / vectors.len() as f32))
    }
}

impl AddAssign<&Vector> for Vector {
    fn add_assign(&mut self, other: &Vector) {
        assert_eq!(self.dim(), other.dim());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }
}

impl Mul<f32> for &Vector {
    type Output = Vector;

    fn mul(self, scalar: f32) -> Vector {
        Vector::new(self.data.iter().map(|x| x * scalar).collect())
    }
}
