//! Statistical summaries of vector fields.
//!
//! One engine per field variant. Engines are constructed from a field
//! reference, run their aggregation immediately and own the results;
//! re-running statistics after a mutation means constructing a new engine.
//! `Default` yields the "no data yet" sentinel (`min = +MAX, max = -MAX,
//! mean = std_dev = 0`), which is also what any engine reports for an empty
//! field. An empty field never divides by zero and never produces NaN.
//!
//! Numeric contract (fixed, not an implementation detail): two passes, the
//! first accumulating min/max/mean, the second the population variance
//! (divide by N, not N-1). Point-valued min/max accumulate component-wise,
//! so `min ≤ mean ≤ max` holds per component.

use serde::{Deserialize, Serialize};

use crate::dense::{DenseVectorfield2D, DenseWeightedVectorfield2D};
use crate::multi::{SparseMultiVectorfield2D, SparseWeightedMultiVectorfield2D};
use crate::point::Point;
use crate::sparse::{SparseVectorfield2D, SparseWeightedVectorfield2D};
use crate::vectorfield::Vectorfield2D;

/// A fixed summary record over one scalar or point-valued quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasicStatistics<T> {
    pub min: T,
    pub max: T,
    pub mean: T,
    pub std_dev: T,
}

impl Default for BasicStatistics<f64> {
    /// The "no data yet" sentinel.
    fn default() -> Self {
        Self {
            min: f64::MAX,
            max: -f64::MAX,
            mean: 0.0,
            std_dev: 0.0,
        }
    }
}

impl Default for BasicStatistics<Point> {
    /// The "no data yet" sentinel, component-wise.
    fn default() -> Self {
        Self {
            min: Point::new(f64::MAX, f64::MAX),
            max: Point::new(-f64::MAX, -f64::MAX),
            mean: Point::ZERO,
            std_dev: Point::ZERO,
        }
    }
}

/// Two-pass summary of a scalar sample sequence. `samples()` must yield the
/// same `count` values on both invocations.
fn scalar_statistics<F, I>(count: usize, samples: F) -> BasicStatistics<f64>
where
    F: Fn() -> I,
    I: Iterator<Item = f64>,
{
    if count == 0 {
        return BasicStatistics::default();
    }
    let n = count as f64;

    let mut min = f64::MAX;
    let mut max = -f64::MAX;
    let mut sum = 0.0;
    for x in samples() {
        min = min.min(x);
        max = max.max(x);
        sum += x;
    }
    let mean = sum / n;

    let mut acc = 0.0;
    for x in samples() {
        let d = mean - x;
        acc += d * d;
    }

    BasicStatistics {
        min,
        max,
        mean,
        std_dev: (acc / n).sqrt(),
    }
}

/// Two-pass summary of a point sample sequence, component-wise.
fn point_statistics<F, I>(count: usize, samples: F) -> BasicStatistics<Point>
where
    F: Fn() -> I,
    I: Iterator<Item = Point>,
{
    if count == 0 {
        return BasicStatistics::default();
    }
    let n = count as f64;

    let mut min = Point::new(f64::MAX, f64::MAX);
    let mut max = Point::new(-f64::MAX, -f64::MAX);
    let mut sum = Point::ZERO;
    for p in samples() {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
        sum = sum + p;
    }
    let mean = sum * (1.0 / n);

    let mut acc = Point::ZERO;
    for p in samples() {
        let d = mean - p;
        acc = acc + Point::new(d.x * d.x, d.y * d.y);
    }

    BasicStatistics {
        min,
        max,
        mean,
        std_dev: Point::new((acc.x / n).sqrt(), (acc.y / n).sqrt()),
    }
}

/// Direction and length summaries shared by every engine.
fn direction_and_length<F>(field: &F) -> (BasicStatistics<Point>, BasicStatistics<f64>)
where
    F: Vectorfield2D + ?Sized,
{
    let n = field.size();
    let direction = point_statistics(n, || (0..n).map(|i| field.direction(i)));
    let length = scalar_statistics(n, || (0..n).map(|i| field.length(i)));
    (direction, length)
}

fn weight_statistics(weights: &[f32]) -> BasicStatistics<f64> {
    scalar_statistics(weights.len(), || weights.iter().map(|&w| w as f64))
}

/// Summary of a [`DenseVectorfield2D`].
#[derive(Debug, Clone, Default)]
pub struct DenseVectorfield2DStatistics {
    direction: BasicStatistics<Point>,
    length: BasicStatistics<f64>,
}

impl DenseVectorfield2DStatistics {
    pub fn new(field: &DenseVectorfield2D) -> Self {
        let (direction, length) = direction_and_length(field);
        Self { direction, length }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        &self.direction
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        &self.length
    }
}

/// Summary of a [`DenseWeightedVectorfield2D`].
#[derive(Debug, Clone, Default)]
pub struct DenseWeightedVectorfield2DStatistics {
    direction: BasicStatistics<Point>,
    length: BasicStatistics<f64>,
    weight: BasicStatistics<f64>,
}

impl DenseWeightedVectorfield2DStatistics {
    pub fn new(field: &DenseWeightedVectorfield2D) -> Self {
        let (direction, length) = direction_and_length(field);
        Self {
            direction,
            length,
            weight: weight_statistics(field.w()),
        }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        &self.direction
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        &self.length
    }

    pub fn weight_stats(&self) -> &BasicStatistics<f64> {
        &self.weight
    }
}

/// Summary of a [`SparseVectorfield2D`].
#[derive(Debug, Clone, Default)]
pub struct SparseVectorfield2DStatistics {
    direction: BasicStatistics<Point>,
    length: BasicStatistics<f64>,
}

impl SparseVectorfield2DStatistics {
    pub fn new(field: &SparseVectorfield2D) -> Self {
        let (direction, length) = direction_and_length(field);
        Self { direction, length }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        &self.direction
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        &self.length
    }
}

/// Summary of a [`SparseWeightedVectorfield2D`].
#[derive(Debug, Clone, Default)]
pub struct SparseWeightedVectorfield2DStatistics {
    direction: BasicStatistics<Point>,
    length: BasicStatistics<f64>,
    weight: BasicStatistics<f64>,
}

impl SparseWeightedVectorfield2DStatistics {
    pub fn new(field: &SparseWeightedVectorfield2D) -> Self {
        let (direction, length) = direction_and_length(field);
        Self {
            direction,
            length,
            weight: weight_statistics(field.weights()),
        }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        &self.direction
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        &self.length
    }

    pub fn weight_stats(&self) -> &BasicStatistics<f64> {
        &self.weight
    }
}

/// Summary of a [`SparseMultiVectorfield2D`].
///
/// Primary-direction summaries as usual, one summary per alternative, and a
/// combined summary pooling the primary and every alternative into one
/// distribution of `N * (K + 1)` samples.
#[derive(Debug, Clone, Default)]
pub struct SparseMultiVectorfield2DStatistics {
    direction: BasicStatistics<Point>,
    length: BasicStatistics<f64>,
    alt_directions: Vec<BasicStatistics<Point>>,
    alt_lengths: Vec<BasicStatistics<f64>>,
    combined_direction: BasicStatistics<Point>,
    combined_length: BasicStatistics<f64>,
}

impl SparseMultiVectorfield2DStatistics {
    pub fn new(field: &SparseMultiVectorfield2D) -> Self {
        let (direction, length) = direction_and_length(field);
        let n = field.size();
        let k = field.alternatives();

        let alt_directions = (0..k)
            .map(|a| point_statistics(n, || (0..n).map(|i| field.alt_direction(i, a))))
            .collect();
        let alt_lengths = (0..k)
            .map(|a| scalar_statistics(n, || (0..n).map(|i| field.alt_length(i, a))))
            .collect();

        let combined_direction = point_statistics(n * (k + 1), || {
            (0..n)
                .map(|i| field.direction(i))
                .chain((0..n).flat_map(|i| field.alt_directions(i).iter().copied()))
        });
        let combined_length = scalar_statistics(n * (k + 1), || {
            (0..n).map(|i| field.length(i)).chain(
                (0..n).flat_map(|i| field.alt_directions(i).iter().map(|p| p.length())),
            )
        });

        Self {
            direction,
            length,
            alt_directions,
            alt_lengths,
            combined_direction,
            combined_length,
        }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        &self.direction
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        &self.length
    }

    /// One summary per stored alternative, indexed by alternative.
    pub fn alt_direction_stats(&self) -> &[BasicStatistics<Point>] {
        &self.alt_directions
    }

    /// One length summary per stored alternative.
    pub fn alt_length_stats(&self) -> &[BasicStatistics<f64>] {
        &self.alt_lengths
    }

    /// Primary and all alternatives pooled into one distribution.
    pub fn combined_direction_stats(&self) -> &BasicStatistics<Point> {
        &self.combined_direction
    }

    /// Lengths of the primary and all alternatives pooled.
    pub fn combined_length_stats(&self) -> &BasicStatistics<f64> {
        &self.combined_length
    }
}

/// Summary of a [`SparseWeightedMultiVectorfield2D`].
#[derive(Debug, Clone, Default)]
pub struct SparseWeightedMultiVectorfield2DStatistics {
    multi: SparseMultiVectorfield2DStatistics,
    weight: BasicStatistics<f64>,
    alt_weights: Vec<BasicStatistics<f64>>,
    combined_weight: BasicStatistics<f64>,
}

impl SparseWeightedMultiVectorfield2DStatistics {
    pub fn new(field: &SparseWeightedMultiVectorfield2D) -> Self {
        let n = field.size();
        let k = field.alternatives();
        let (direction, length) = direction_and_length(field);

        let alt_directions = (0..k)
            .map(|a| point_statistics(n, || (0..n).map(|i| field.alt_direction(i, a))))
            .collect();
        let alt_lengths = (0..k)
            .map(|a| scalar_statistics(n, || (0..n).map(|i| field.alt_length(i, a))))
            .collect();
        let combined_direction = point_statistics(n * (k + 1), || {
            (0..n)
                .map(|i| field.direction(i))
                .chain((0..n).flat_map(|i| field.alt_directions(i).iter().copied()))
        });
        let combined_length = scalar_statistics(n * (k + 1), || {
            (0..n).map(|i| field.length(i)).chain(
                (0..n).flat_map(|i| field.alt_directions(i).iter().map(|p| p.length())),
            )
        });

        let alt_weights = (0..k)
            .map(|a| scalar_statistics(n, || (0..n).map(|i| field.alt_weight(i, a) as f64)))
            .collect();
        let combined_weight = scalar_statistics(n * (k + 1), || {
            field.weights().iter().map(|&w| w as f64).chain(
                (0..n).flat_map(|i| field.alt_weights(i).iter().map(|&w| w as f64)),
            )
        });

        Self {
            multi: SparseMultiVectorfield2DStatistics {
                direction,
                length,
                alt_directions,
                alt_lengths,
                combined_direction,
                combined_length,
            },
            weight: weight_statistics(field.weights()),
            alt_weights,
            combined_weight,
        }
    }

    pub fn direction_stats(&self) -> &BasicStatistics<Point> {
        self.multi.direction_stats()
    }

    pub fn length_stats(&self) -> &BasicStatistics<f64> {
        self.multi.length_stats()
    }

    pub fn weight_stats(&self) -> &BasicStatistics<f64> {
        &self.weight
    }

    pub fn alt_direction_stats(&self) -> &[BasicStatistics<Point>] {
        self.multi.alt_direction_stats()
    }

    pub fn alt_length_stats(&self) -> &[BasicStatistics<f64>] {
        self.multi.alt_length_stats()
    }

    /// One weight summary per stored alternative.
    pub fn alt_weight_stats(&self) -> &[BasicStatistics<f64>] {
        &self.alt_weights
    }

    pub fn combined_direction_stats(&self) -> &BasicStatistics<Point> {
        self.multi.combined_direction_stats()
    }

    pub fn combined_length_stats(&self) -> &BasicStatistics<f64> {
        self.multi.combined_length_stats()
    }

    /// Primary and all alternative weights pooled into one distribution.
    pub fn combined_weight_stats(&self) -> &BasicStatistics<f64> {
        &self.combined_weight
    }
}
