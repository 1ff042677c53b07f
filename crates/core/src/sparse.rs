//! List-backed vector fields.
//!
//! Sparse fields store an explicit origin for every vector in parallel
//! sequences. The sequences are never exposed mutably one at a time: all
//! mutation goes through methods that keep `origins`, `directions` (and
//! `weights`) at equal length.

use crate::point::Point;
use crate::vectorfield::{FieldCommon, Vectorfield2D};

/// A sparse 2D vector field: an ordered list of (origin, direction) pairs.
#[derive(Debug, Clone)]
pub struct SparseVectorfield2D {
    common: FieldCommon,
    origins: Vec<Point>,
    directions: Vec<Point>,
}

impl SparseVectorfield2D {
    /// Creates an empty field with the given extent.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            common: FieldCommon::new(width, height),
            origins: Vec::new(),
            directions: Vec::new(),
        }
    }

    /// Appends a vector. No-op while locked.
    pub fn add_vector(&mut self, origin: Point, direction: Point) {
        if self.common.is_locked() {
            return;
        }
        self.origins.push(origin);
        self.directions.push(direction);
        self.common.notify();
    }

    /// Removes vector `index` from every parallel sequence.
    ///
    /// An out-of-range index is a no-op, so removing twice is harmless.
    pub fn remove_vector(&mut self, index: usize) {
        if self.common.is_locked() || index >= self.origins.len() {
            return;
        }
        self.origins.remove(index);
        self.directions.remove(index);
        self.common.notify();
    }

    /// Moves the origin of vector `index`. No-op while locked.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` (and the field is unlocked).
    pub fn set_origin(&mut self, index: usize, origin: Point) {
        if self.common.is_locked() {
            return;
        }
        assert!(
            index < self.origins.len(),
            "index {index} out of range for field of size {}",
            self.origins.len()
        );
        self.origins[index] = origin;
        self.common.notify();
    }

    /// Read-only view of all origins.
    pub fn origins(&self) -> &[Point] {
        &self.origins
    }

    /// Read-only view of all directions.
    pub fn directions(&self) -> &[Point] {
        &self.directions
    }
}

impl Vectorfield2D for SparseVectorfield2D {
    fn common(&self) -> &FieldCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut FieldCommon {
        &mut self.common
    }

    fn size(&self) -> usize {
        self.origins.len()
    }

    fn clear(&mut self) {
        if self.common.is_locked() {
            return;
        }
        self.origins.clear();
        self.directions.clear();
        self.common.notify();
    }

    fn origin(&self, index: usize) -> Point {
        assert!(
            index < self.origins.len(),
            "index {index} out of range for field of size {}",
            self.origins.len()
        );
        self.origins[index]
    }

    fn direction(&self, index: usize) -> Point {
        assert!(
            index < self.directions.len(),
            "index {index} out of range for field of size {}",
            self.directions.len()
        );
        self.directions[index]
    }

    fn set_direction(&mut self, index: usize, direction: Point) {
        if self.common.is_locked() {
            return;
        }
        assert!(
            index < self.directions.len(),
            "index {index} out of range for field of size {}",
            self.directions.len()
        );
        self.directions[index] = direction;
        self.common.notify();
    }

    fn set_size(&mut self, width: usize, height: usize) {
        if self.common.is_locked() {
            return;
        }
        // Sparse storage is extent-independent; only the declared extent moves.
        self.common.set_extent(width, height);
        self.common.notify();
    }
}

/// A sparse field with one scalar weight per vector.
#[derive(Debug, Clone)]
pub struct SparseWeightedVectorfield2D {
    field: SparseVectorfield2D,
    weights: Vec<f32>,
}

impl SparseWeightedVectorfield2D {
    /// Creates an empty weighted field with the given extent.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            field: SparseVectorfield2D::new(width, height),
            weights: Vec::new(),
        }
    }

    /// Appends a vector with weight 0.
    pub fn add_vector(&mut self, origin: Point, direction: Point) {
        self.add_weighted_vector(origin, direction, 0.0);
    }

    /// Appends a vector with an explicit weight. No-op while locked.
    pub fn add_weighted_vector(&mut self, origin: Point, direction: Point, weight: f32) {
        if self.is_locked() {
            return;
        }
        self.weights.push(weight);
        self.field.add_vector(origin, direction);
    }

    /// Removes vector `index` from every parallel sequence; out-of-range is
    /// a no-op.
    pub fn remove_vector(&mut self, index: usize) {
        if self.is_locked() || index >= self.weights.len() {
            return;
        }
        self.weights.remove(index);
        self.field.remove_vector(index);
    }

    /// Moves the origin of vector `index`.
    pub fn set_origin(&mut self, index: usize, origin: Point) {
        self.field.set_origin(index, origin);
    }

    /// Weight of vector `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()`.
    pub fn weight(&self, index: usize) -> f32 {
        assert!(
            index < self.weights.len(),
            "index {index} out of range for field of size {}",
            self.weights.len()
        );
        self.weights[index]
    }

    /// Replaces the weight of vector `index`. No-op while locked.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` (and the field is unlocked).
    pub fn set_weight(&mut self, index: usize, weight: f32) {
        if self.is_locked() {
            return;
        }
        assert!(
            index < self.weights.len(),
            "index {index} out of range for field of size {}",
            self.weights.len()
        );
        self.weights[index] = weight;
        self.field.common.notify();
    }

    /// Read-only view of all origins.
    pub fn origins(&self) -> &[Point] {
        self.field.origins()
    }

    /// Read-only view of all directions.
    pub fn directions(&self) -> &[Point] {
        self.field.directions()
    }

    /// Read-only view of all weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl Vectorfield2D for SparseWeightedVectorfield2D {
    fn common(&self) -> &FieldCommon {
        self.field.common()
    }

    fn common_mut(&mut self) -> &mut FieldCommon {
        self.field.common_mut()
    }

    fn size(&self) -> usize {
        self.field.size()
    }

    fn clear(&mut self) {
        if self.is_locked() {
            return;
        }
        self.weights.clear();
        self.field.clear();
    }

    fn origin(&self, index: usize) -> Point {
        self.field.origin(index)
    }

    fn direction(&self, index: usize) -> Point {
        self.field.direction(index)
    }

    fn set_direction(&mut self, index: usize, direction: Point) {
        self.field.set_direction(index, direction);
    }

    fn set_size(&mut self, width: usize, height: usize) {
        self.field.set_size(width, height);
    }
}
