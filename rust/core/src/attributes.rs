// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named attribute arrays attached to points or cells
//!
//! Every array stores `tuple_count * components` values in tuple-major
//! order. An [`AttributeSet`] keeps its arrays in insertion order; two sets
//! built from the same schema can therefore be paired positionally.

use crate::error::{Error, Result};
use smallvec::SmallVec;

/// Raw values of a data array
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrayData {
    Float(Vec<f64>),
    Int(Vec<i64>),
}

impl ArrayData {
    /// Total number of stored values
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float(v) => v.len(),
            ArrayData::Int(v) => v.len(),
        }
    }

    /// Check if no values are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named array with a fixed number of components per tuple
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataArray {
    name: String,
    components: usize,
    data: ArrayData,
}

impl DataArray {
    /// Create a floating-point array
    pub fn float(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            data: ArrayData::Float(values),
        }
    }

    /// Create an integer array
    pub fn int(name: impl Into<String>, components: usize, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            data: ArrayData::Int(values),
        }
    }

    /// Create a single-component floating-point array
    pub fn scalars(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::float(name, 1, values)
    }

    /// Create a three-component floating-point array
    pub fn vectors(name: impl Into<String>, values: &[[f64; 3]]) -> Self {
        Self::float(name, 3, values.iter().flatten().copied().collect())
    }

    /// Empty array with the same name, component count and value type
    pub fn empty_like(&self, tuple_capacity: usize) -> Self {
        let capacity = tuple_capacity * self.components;
        let data = match &self.data {
            ArrayData::Float(_) => ArrayData::Float(Vec::with_capacity(capacity)),
            ArrayData::Int(_) => ArrayData::Int(Vec::with_capacity(capacity)),
        };
        Self {
            name: self.name.clone(),
            components: self.components,
            data,
        }
    }

    /// Array name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components per tuple
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Raw values
    #[inline]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Mutable raw values
    #[inline]
    pub fn data_mut(&mut self) -> &mut ArrayData {
        &mut self.data
    }

    /// Number of tuples
    #[inline]
    pub fn tuple_count(&self) -> usize {
        self.data.len() / self.components
    }

    /// Component `component` of tuple `tuple`, converted to f64
    #[inline]
    pub fn component(&self, tuple: usize, component: usize) -> f64 {
        let i = tuple * self.components + component;
        match &self.data {
            ArrayData::Float(v) => v[i],
            ArrayData::Int(v) => v[i] as f64,
        }
    }

    /// All components of tuple `tuple`, converted to f64
    pub fn tuple(&self, tuple: usize) -> SmallVec<[f64; 4]> {
        (0..self.components)
            .map(|c| self.component(tuple, c))
            .collect()
    }

    /// First three components of tuple `tuple`; missing components read as 0
    pub fn tuple3(&self, tuple: usize) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (c, slot) in out.iter_mut().enumerate().take(self.components) {
            *slot = self.component(tuple, c);
        }
        out
    }

    /// Check that the value count is a whole number of tuples
    pub fn validate(&self) -> Result<()> {
        if self.data.len() % self.components != 0 {
            return Err(Error::RaggedArray {
                name: self.name.clone(),
                values: self.data.len(),
                components: self.components,
            });
        }
        Ok(())
    }

    /// Release over-allocated capacity
    pub fn shrink_to_fit(&mut self) {
        match &mut self.data {
            ArrayData::Float(v) => v.shrink_to_fit(),
            ArrayData::Int(v) => v.shrink_to_fit(),
        }
    }
}

/// Ordered collection of named arrays
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSet {
    arrays: Vec<DataArray>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { arrays: Vec::new() }
    }

    /// Add an array, replacing any existing array of the same name in place
    pub fn add(&mut self, array: DataArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(slot) => *slot = array,
            None => self.arrays.push(array),
        }
    }

    /// Look up an array by name
    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Check if an array of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of arrays
    #[inline]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Check if the set holds no arrays
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Iterate over arrays in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }

    /// Iterate mutably over arrays in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DataArray> {
        self.arrays.iter_mut()
    }

    /// Array names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(|a| a.name())
    }

    /// Empty set with the same schema (names, components, value types)
    pub fn empty_like(&self, tuple_capacity: usize) -> Self {
        Self {
            arrays: self
                .arrays
                .iter()
                .map(|a| a.empty_like(tuple_capacity))
                .collect(),
        }
    }

    /// Check that every array holds exactly `tuples` whole tuples
    pub fn validate(&self, tuples: usize) -> Result<()> {
        for array in &self.arrays {
            array.validate()?;
            if array.tuple_count() != tuples {
                return Err(Error::AttributeLengthMismatch {
                    name: array.name.clone(),
                    expected: tuples,
                    found: array.tuple_count(),
                });
            }
        }
        Ok(())
    }

    /// Release over-allocated capacity
    pub fn shrink_to_fit(&mut self) {
        for array in &mut self.arrays {
            array.shrink_to_fit();
        }
        self.arrays.shrink_to_fit();
    }
}
