//! Sample buffer management and operations

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Fixed-capacity circular queue holding the most recent raw input samples.
///
/// Pushing is O(1): the head index rotates and the oldest entry is
/// overwritten once the ring is full. Reads are positional, counted back
/// from the newest entry.
#[derive(Debug, Clone)]
pub struct LookbackRing {
    data: Vec<f64>,
    head: usize,
    len: usize,
}

impl LookbackRing {
    /// Allocate a ring for `capacity` samples.
    ///
    /// The storage is reserved fallibly, so an allocation failure is
    /// reported as [`CoreError::OutOfMemory`] instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| CoreError::OutOfMemory { requested: capacity })?;
        data.resize(capacity, 0.0);

        Ok(Self {
            data,
            head: capacity.saturating_sub(1),
            len: 0,
        })
    }

    /// Push a sequence of samples, oldest first
    pub fn prime(&mut self, values: &[f64]) {
        for &value in values {
            self.push(value);
        }
    }

    /// Insert a sample as the newest entry, evicting the oldest when full
    #[inline]
    pub fn push(&mut self, value: f64) {
        let capacity = self.data.len();
        if capacity == 0 {
            return;
        }

        self.head = (self.head + 1) % capacity;
        self.data[self.head] = value;
        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Sample `offset` steps back from the newest one (0 = newest)
    #[inline]
    pub fn newest(&self, offset: usize) -> Option<f64> {
        if offset >= self.len {
            return None;
        }
        let capacity = self.data.len();
        Some(self.data[(self.head + capacity - offset) % capacity])
    }

    /// Iterate over the stored samples, newest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).filter_map(move |offset| self.newest(offset))
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }
}

/// Real-valued samples with an explicit shape.
///
/// This is how traces and coefficient vectors arrive from callers that do
/// not guarantee flat data (file loaders, the Python extension). The kernel
/// only accepts arrays whose shape has exactly one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleArray {
    data: Vec<f64>,
    shape: Vec<usize>,
}

impl SampleArray {
    /// Create an array from flat row-major data and a shape
    pub fn with_shape(data: Vec<f64>, shape: Vec<usize>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CoreError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { data, shape })
    }

    /// Create a two-dimensional array from equally sized rows
    pub fn from_nested(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(CoreError::BufferSizeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Self::with_shape(data, vec![rows.len(), cols])
    }

    /// Create a zero-dimensional array holding one value
    pub fn scalar(value: f64) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
        }
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the samples, regardless of shape
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Borrow the samples as a flat sequence, failing unless the array is 1-D
    pub fn as_1d(&self, name: &'static str) -> Result<&[f64]> {
        if self.ndim() != 1 {
            return Err(CoreError::InvalidShape {
                name,
                ndim: self.ndim(),
            });
        }
        Ok(&self.data)
    }

    /// Consume the array into its flat samples, failing unless it is 1-D
    pub fn into_1d(self, name: &'static str) -> Result<Vec<f64>> {
        self.as_1d(name)?;
        Ok(self.data)
    }
}

impl From<Vec<f64>> for SampleArray {
    fn from(data: Vec<f64>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }
}

impl From<&[f64]> for SampleArray {
    fn from(data: &[f64]) -> Self {
        Self::from(data.to_vec())
    }
}

impl Index<usize> for SampleArray {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}
