//! Sparse fields carrying K alternative directions per vector.
//!
//! Besides its primary direction, every vector of a "multi" field stores
//! exactly `alternatives()` extra direction candidates. Alternative indices
//! are **0-based over the stored alternatives**; the primary direction is
//! addressed only through `direction(index)`. (The XML wire format numbers
//! `altDirection` elements from 1; that offset lives in the codec, not
//! here.)
//!
//! Invariant: every inner sequence has length exactly `alternatives()`.
//! Changing the alternative count resizes all existing inner sequences
//! immediately, truncating or zero-padding.

use crate::point::Point;
use crate::sparse::SparseVectorfield2D;
use crate::vectorfield::{FieldCommon, Vectorfield2D};

/// A sparse field with K alternative directions per vector.
#[derive(Debug, Clone)]
pub struct SparseMultiVectorfield2D {
    field: SparseVectorfield2D,
    alternatives: usize,
    alt_directions: Vec<Vec<Point>>,
}

impl SparseMultiVectorfield2D {
    /// Creates an empty field with the given extent and alternative count.
    pub fn new(width: usize, height: usize, alternatives: usize) -> Self {
        Self {
            field: SparseVectorfield2D::new(width, height),
            alternatives,
            alt_directions: Vec::new(),
        }
    }

    /// Number of alternative directions stored per vector (K).
    pub fn alternatives(&self) -> usize {
        self.alternatives
    }

    /// Changes K. Every existing vector's alternative sequence is resized
    /// immediately: surplus entries are truncated, missing entries are
    /// zero-padded. No-op while locked.
    pub fn set_alternatives(&mut self, alternatives: usize) {
        if self.is_locked() {
            return;
        }
        self.alternatives = alternatives;
        for alts in &mut self.alt_directions {
            alts.resize(alternatives, Point::ZERO);
        }
        self.field.common().notify();
    }

    /// Appends a vector with K zero alternatives. No-op while locked.
    pub fn add_vector(&mut self, origin: Point, direction: Point) {
        if self.is_locked() {
            return;
        }
        self.alt_directions.push(vec![Point::ZERO; self.alternatives]);
        self.field.add_vector(origin, direction);
    }

    /// Appends a vector with explicit alternatives; the given sequence is
    /// truncated or zero-padded to exactly K entries. No-op while locked.
    pub fn add_vector_with_alternatives(
        &mut self,
        origin: Point,
        direction: Point,
        mut alternatives: Vec<Point>,
    ) {
        if self.is_locked() {
            return;
        }
        alternatives.resize(self.alternatives, Point::ZERO);
        self.alt_directions.push(alternatives);
        self.field.add_vector(origin, direction);
    }

    /// Removes vector `index` from every parallel sequence; out-of-range is
    /// a no-op.
    pub fn remove_vector(&mut self, index: usize) {
        if self.is_locked() || index >= self.alt_directions.len() {
            return;
        }
        self.alt_directions.remove(index);
        self.field.remove_vector(index);
    }

    /// Moves the origin of vector `index`.
    pub fn set_origin(&mut self, index: usize, origin: Point) {
        self.field.set_origin(index, origin);
    }

    /// Alternative `alt` of vector `index` (0-based over stored
    /// alternatives).
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` or `alt >= alternatives()`.
    pub fn alt_direction(&self, index: usize, alt: usize) -> Point {
        assert!(
            index < self.alt_directions.len(),
            "index {index} out of range for field of size {}",
            self.alt_directions.len()
        );
        assert!(
            alt < self.alternatives,
            "alternative {alt} out of range for {} alternatives",
            self.alternatives
        );
        self.alt_directions[index][alt]
    }

    /// Replaces alternative `alt` of vector `index`. No-op while locked.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` or `alt >= alternatives()` (and the field
    /// is unlocked).
    pub fn set_alt_direction(&mut self, index: usize, alt: usize, direction: Point) {
        if self.is_locked() {
            return;
        }
        assert!(
            index < self.alt_directions.len(),
            "index {index} out of range for field of size {}",
            self.alt_directions.len()
        );
        assert!(
            alt < self.alternatives,
            "alternative {alt} out of range for {} alternatives",
            self.alternatives
        );
        self.alt_directions[index][alt] = direction;
        self.field.common().notify();
    }

    /// All stored alternatives of vector `index`.
    pub fn alt_directions(&self, index: usize) -> &[Point] {
        &self.alt_directions[index]
    }

    /// Length of alternative `alt` of vector `index`.
    pub fn alt_length(&self, index: usize, alt: usize) -> f64 {
        self.alt_direction(index, alt).length()
    }

    /// Squared length of alternative `alt` of vector `index`.
    pub fn alt_squared_length(&self, index: usize, alt: usize) -> f64 {
        self.alt_direction(index, alt).squared_length()
    }

    /// Angle of alternative `alt` of vector `index`, degrees in `[0, 360)`.
    pub fn alt_angle(&self, index: usize, alt: usize) -> f64 {
        self.alt_direction(index, alt).angle()
    }

    /// End point of alternative `alt` of vector `index`.
    pub fn alt_target(&self, index: usize, alt: usize) -> Point {
        self.origin(index) + self.alt_direction(index, alt)
    }

    /// Read-only view of all origins.
    pub fn origins(&self) -> &[Point] {
        self.field.origins()
    }

    /// Read-only view of all primary directions.
    pub fn directions(&self) -> &[Point] {
        self.field.directions()
    }
}

impl Vectorfield2D for SparseMultiVectorfield2D {
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
        self.alt_directions.clear();
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

/// A sparse multi field that additionally weights the primary direction and
/// every alternative.
#[derive(Debug, Clone)]
pub struct SparseWeightedMultiVectorfield2D {
    field: SparseMultiVectorfield2D,
    weights: Vec<f32>,
    alt_weights: Vec<Vec<f32>>,
}

impl SparseWeightedMultiVectorfield2D {
    /// Creates an empty field with the given extent and alternative count.
    pub fn new(width: usize, height: usize, alternatives: usize) -> Self {
        Self {
            field: SparseMultiVectorfield2D::new(width, height, alternatives),
            weights: Vec::new(),
            alt_weights: Vec::new(),
        }
    }

    /// Number of alternative directions stored per vector (K).
    pub fn alternatives(&self) -> usize {
        self.field.alternatives()
    }

    /// Changes K, resizing alternative directions and weights of every
    /// existing vector immediately. No-op while locked.
    pub fn set_alternatives(&mut self, alternatives: usize) {
        if self.is_locked() {
            return;
        }
        for weights in &mut self.alt_weights {
            weights.resize(alternatives, 0.0);
        }
        self.field.set_alternatives(alternatives);
    }

    /// Appends a vector with weight 0 and K zero alternatives.
    pub fn add_vector(&mut self, origin: Point, direction: Point) {
        self.add_weighted_vector(origin, direction, 0.0);
    }

    /// Appends a vector with an explicit primary weight. No-op while locked.
    pub fn add_weighted_vector(&mut self, origin: Point, direction: Point, weight: f32) {
        if self.is_locked() {
            return;
        }
        self.weights.push(weight);
        self.alt_weights.push(vec![0.0; self.alternatives()]);
        self.field.add_vector(origin, direction);
    }

    /// Removes vector `index` from every parallel sequence; out-of-range is
    /// a no-op.
    pub fn remove_vector(&mut self, index: usize) {
        if self.is_locked() || index >= self.weights.len() {
            return;
        }
        self.weights.remove(index);
        self.alt_weights.remove(index);
        self.field.remove_vector(index);
    }

    /// Moves the origin of vector `index`.
    pub fn set_origin(&mut self, index: usize, origin: Point) {
        self.field.set_origin(index, origin);
    }

    /// Primary weight of vector `index`.
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

    /// Replaces the primary weight of vector `index`. No-op while locked.
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
        self.field.common().notify();
    }

    /// Weight of alternative `alt` of vector `index` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` or `alt >= alternatives()`.
    pub fn alt_weight(&self, index: usize, alt: usize) -> f32 {
        assert!(
            index < self.alt_weights.len(),
            "index {index} out of range for field of size {}",
            self.alt_weights.len()
        );
        assert!(
            alt < self.alternatives(),
            "alternative {alt} out of range for {} alternatives",
            self.alternatives()
        );
        self.alt_weights[index][alt]
    }

    /// Replaces the weight of alternative `alt` of vector `index`. No-op
    /// while locked.
    pub fn set_alt_weight(&mut self, index: usize, alt: usize, weight: f32) {
        if self.is_locked() {
            return;
        }
        assert!(
            index < self.alt_weights.len(),
            "index {index} out of range for field of size {}",
            self.alt_weights.len()
        );
        assert!(
            alt < self.alternatives(),
            "alternative {alt} out of range for {} alternatives",
            self.alternatives()
        );
        self.alt_weights[index][alt] = weight;
        self.field.common().notify();
    }

    /// Alternative `alt` of vector `index` (0-based).
    pub fn alt_direction(&self, index: usize, alt: usize) -> Point {
        self.field.alt_direction(index, alt)
    }

    /// Replaces alternative `alt` of vector `index`.
    pub fn set_alt_direction(&mut self, index: usize, alt: usize, direction: Point) {
        self.field.set_alt_direction(index, alt, direction);
    }

    /// All stored alternatives of vector `index`.
    pub fn alt_directions(&self, index: usize) -> &[Point] {
        self.field.alt_directions(index)
    }

    /// All stored alternative weights of vector `index`.
    pub fn alt_weights(&self, index: usize) -> &[f32] {
        &self.alt_weights[index]
    }

    /// Length of alternative `alt` of vector `index`.
    pub fn alt_length(&self, index: usize, alt: usize) -> f64 {
        self.field.alt_length(index, alt)
    }

    /// Squared length of alternative `alt` of vector `index`.
    pub fn alt_squared_length(&self, index: usize, alt: usize) -> f64 {
        self.field.alt_squared_length(index, alt)
    }

    /// Angle of alternative `alt` of vector `index`, degrees in `[0, 360)`.
    pub fn alt_angle(&self, index: usize, alt: usize) -> f64 {
        self.field.alt_angle(index, alt)
    }

    /// End point of alternative `alt` of vector `index`.
    pub fn alt_target(&self, index: usize, alt: usize) -> Point {
        self.field.alt_target(index, alt)
    }

    /// Read-only view of all origins.
    pub fn origins(&self) -> &[Point] {
        self.field.origins()
    }

    /// Read-only view of all primary directions.
    pub fn directions(&self) -> &[Point] {
        self.field.directions()
    }

    /// Read-only view of all primary weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl Vectorfield2D for SparseWeightedMultiVectorfield2D {
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
        self.alt_weights.clear();
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

#[cfg(test)]
mod tests {
    use super::*;

    // -- Alternative storage --

    #[test]
    fn add_vector_zero_fills_k_alternatives() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 3);
        field.add_vector(Point::new(1.0, 1.0), Point::new(0.5, 0.5));
        assert_eq!(field.alt_directions(0).len(), 3);
        assert!(field.alt_directions(0).iter().all(|&p| p == Point::ZERO));
    }

    #[test]
    fn add_vector_with_alternatives_pads_and_truncates_to_k() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector_with_alternatives(
            Point::ZERO,
            Point::ZERO,
            vec![Point::new(1.0, 0.0)],
        );
        field.add_vector_with_alternatives(
            Point::ZERO,
            Point::ZERO,
            vec![Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)],
        );
        assert_eq!(field.alt_directions(0), &[Point::new(1.0, 0.0), Point::ZERO]);
        assert_eq!(
            field.alt_directions(1),
            &[Point::new(1.0, 0.0), Point::new(2.0, 0.0)]
        );
    }

    #[test]
    fn alt_accessors_are_zero_based_over_stored_alternatives() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::new(9.0, 9.0));
        field.set_alt_direction(0, 0, Point::new(1.0, 0.0));
        field.set_alt_direction(0, 1, Point::new(0.0, 2.0));
        assert_eq!(field.alt_direction(0, 0), Point::new(1.0, 0.0));
        assert_eq!(field.alt_direction(0, 1), Point::new(0.0, 2.0));
        // The primary direction is only reachable via direction().
        assert_eq!(field.direction(0), Point::new(9.0, 9.0));
    }

    #[test]
    #[should_panic(expected = "alternative")]
    fn alt_direction_beyond_k_panics() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        let _ = field.alt_direction(0, 2);
    }

    // -- Resizing K --

    #[test]
    fn set_alternatives_resizes_existing_vectors_immediately() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        field.set_alt_direction(0, 0, Point::new(1.0, 1.0));

        field.set_alternatives(0);
        assert_eq!(field.alternatives(), 0);
        assert!(field.alt_directions(0).is_empty());

        field.set_alternatives(3);
        assert_eq!(field.alt_directions(0).len(), 3);
        assert!(field.alt_directions(0).iter().all(|&p| p == Point::ZERO));
    }

    #[test]
    fn set_alternatives_pads_with_zero_and_keeps_survivors() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        field.set_alt_direction(0, 0, Point::new(1.0, 0.0));
        field.set_alt_direction(0, 1, Point::new(2.0, 0.0));

        field.set_alternatives(3);
        assert_eq!(
            field.alt_directions(0),
            &[Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::ZERO]
        );
    }

    // -- Derived quantities --

    #[test]
    fn alt_length_angle_and_target_derive_from_the_alternative() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 1);
        field.add_vector(Point::new(1.0, 1.0), Point::ZERO);
        field.set_alt_direction(0, 0, Point::new(0.0, 3.0));
        assert!((field.alt_length(0, 0) - 3.0).abs() < 1e-12);
        assert!((field.alt_squared_length(0, 0) - 9.0).abs() < 1e-12);
        assert!((field.alt_angle(0, 0) - 90.0).abs() < 1e-12);
        assert_eq!(field.alt_target(0, 0), Point::new(1.0, 4.0));
    }

    // -- Locking --

    #[test]
    fn locked_multi_field_ignores_every_mutator() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        field.set_locked(true);

        field.add_vector(Point::ZERO, Point::ZERO);
        field.set_alt_direction(0, 0, Point::new(1.0, 1.0));
        field.set_alternatives(5);
        field.remove_vector(0);
        field.clear();

        assert_eq!(field.size(), 1);
        assert_eq!(field.alternatives(), 2);
        assert_eq!(field.alt_direction(0, 0), Point::ZERO);
    }

    // -- Weighted multi --

    #[test]
    fn weighted_multi_zero_fills_weights_and_alt_weights() {
        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        assert_eq!(field.weight(0), 0.0);
        assert_eq!(field.alt_weights(0), &[0.0, 0.0]);
    }

    #[test]
    fn weighted_multi_set_alternatives_resizes_weights_too() {
        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 2);
        field.add_weighted_vector(Point::ZERO, Point::ZERO, 1.0);
        field.set_alt_weight(0, 1, 0.5);

        field.set_alternatives(1);
        assert_eq!(field.alt_weights(0), &[0.0]);
        assert_eq!(field.alt_directions(0).len(), 1);

        field.set_alternatives(4);
        assert_eq!(field.alt_weights(0).len(), 4);
        assert_eq!(field.alt_directions(0).len(), 4);
    }

    #[test]
    fn weighted_multi_remove_keeps_all_sequences_parallel() {
        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 1);
        field.add_weighted_vector(Point::new(1.0, 1.0), Point::ZERO, 1.0);
        field.add_weighted_vector(Point::new(2.0, 2.0), Point::ZERO, 2.0);
        field.set_alt_weight(1, 0, 0.25);

        field.remove_vector(0);
        assert_eq!(field.size(), 1);
        assert_eq!(field.weight(0), 2.0);
        assert_eq!(field.alt_weight(0, 0), 0.25);
    }

    // -- Update notification --

    #[test]
    fn multi_mutators_notify_exactly_once_each() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        let count = Rc::new(Cell::new(0_usize));
        let seen = Rc::clone(&count);
        field
            .common_mut()
            .set_on_update(Some(Rc::new(move || seen.set(seen.get() + 1))));

        field.add_vector(Point::ZERO, Point::ZERO);
        assert_eq!(count.get(), 1, "add_vector must notify exactly once");
        field.add_vector_with_alternatives(
            Point::ZERO,
            Point::ZERO,
            vec![Point::new(1.0, 0.0)],
        );
        assert_eq!(
            count.get(),
            2,
            "add_vector_with_alternatives must notify exactly once"
        );
        field.set_alt_direction(0, 0, Point::new(1.0, 1.0));
        assert_eq!(count.get(), 3, "set_alt_direction must notify exactly once");
        field.set_alternatives(3);
        assert_eq!(count.get(), 4, "set_alternatives must notify exactly once");
        field.clear();
        assert_eq!(count.get(), 5, "clear must notify exactly once");
    }

    #[test]
    fn weighted_multi_mutators_notify_exactly_once_each() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 2);
        let count = Rc::new(Cell::new(0_usize));
        let seen = Rc::clone(&count);
        field
            .common_mut()
            .set_on_update(Some(Rc::new(move || seen.set(seen.get() + 1))));

        field.add_weighted_vector(Point::ZERO, Point::ZERO, 1.0);
        assert_eq!(count.get(), 1, "add_weighted_vector must notify exactly once");
        field.set_alternatives(3);
        assert_eq!(count.get(), 2, "set_alternatives must notify exactly once");
        field.set_weight(0, 2.0);
        assert_eq!(count.get(), 3, "set_weight must notify exactly once");
        field.set_alt_weight(0, 0, 0.5);
        assert_eq!(count.get(), 4, "set_alt_weight must notify exactly once");
        field.set_alt_direction(0, 0, Point::new(1.0, 1.0));
        assert_eq!(
            count.get(),
            5,
            "delegated set_alt_direction must notify exactly once"
        );
        field.remove_vector(0);
        assert_eq!(count.get(), 6, "remove_vector must notify exactly once");
        field.clear();
        assert_eq!(count.get(), 7, "clear must notify exactly once");
    }

    #[test]
    fn locked_weighted_multi_field_ignores_weight_mutations() {
        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 1);
        field.add_weighted_vector(Point::ZERO, Point::ZERO, 1.0);
        field.set_locked(true);
        field.set_weight(0, 9.0);
        field.set_alt_weight(0, 0, 9.0);
        field.set_alternatives(7);
        assert_eq!(field.weight(0), 1.0);
        assert_eq!(field.alt_weight(0, 0), 0.0);
        assert_eq!(field.alternatives(), 1);
    }
}
