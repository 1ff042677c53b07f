//! Array-backed vector fields.
//!
//! A dense field stores one vector per grid cell in two row-major `f32`
//! channels `u` and `v`; the weighted variant adds a third channel `w`.
//! Origins are never stored: vector `index` starts at
//! `(index % width, index / width)`. This index/coordinate mapping is part
//! of the public contract: it fixes the iteration order and the row-major
//! layout of the serialized channels.

use crate::error::FieldError;
use crate::point::Point;
use crate::vectorfield::{FieldCommon, Vectorfield2D};

fn checked_len(width: usize, height: usize) -> Result<usize, FieldError> {
    if width == 0 || height == 0 {
        return Err(FieldError::InvalidDimensions);
    }
    width.checked_mul(height).ok_or(FieldError::InvalidDimensions)
}

/// A dense 2D vector field: one vector per cell of a `width × height` grid.
///
/// Invariant: `u.len() == v.len() == width * height` at all times. Any
/// change of the extent reallocates both channels synchronously.
#[derive(Debug, Clone)]
pub struct DenseVectorfield2D {
    common: FieldCommon,
    u: Vec<f32>,
    v: Vec<f32>,
}

impl DenseVectorfield2D {
    /// Creates a zero-filled field of the given extent.
    ///
    /// Returns `FieldError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            common: FieldCommon::new(width, height),
            u: vec![0.0; len],
            v: vec![0.0; len],
        })
    }

    /// Creates a field from pre-built channel buffers, validating that both
    /// have exactly `width * height` values.
    pub fn from_channels(
        width: usize,
        height: usize,
        u: Vec<f32>,
        v: Vec<f32>,
    ) -> Result<Self, FieldError> {
        let len = checked_len(width, height)?;
        for channel in [&u, &v] {
            if channel.len() != len {
                return Err(FieldError::DimensionMismatch {
                    expected: len,
                    actual: channel.len(),
                });
            }
        }
        Ok(Self {
            common: FieldCommon::new(width, height),
            u,
            v,
        })
    }

    /// Converts grid coordinates to the flat vector index `y * width + x`.
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.common.width() + x
    }

    /// The x coordinate of vector `index`.
    pub fn index_to_x(&self, index: usize) -> usize {
        index % self.common.width()
    }

    /// The y coordinate of vector `index`.
    pub fn index_to_y(&self, index: usize) -> usize {
        index / self.common.width()
    }

    /// Whether the signed coordinates address a cell inside the grid.
    pub fn is_inside(&self, x: isize, y: isize) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.common.width()
            && (y as usize) < self.common.height()
    }

    /// Whether the point lies inside the grid (cells cover `[0, width) ×
    /// `[0, height)`).
    pub fn is_inside_point(&self, p: Point) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x < self.common.width() as f64
            && p.y < self.common.height() as f64
    }

    /// The x-displacement channel, row-major.
    pub fn u(&self) -> &[f32] {
        &self.u
    }

    /// The y-displacement channel, row-major.
    pub fn v(&self) -> &[f32] {
        &self.v
    }

    /// Replaces the whole `u` channel.
    ///
    /// Only applied when the buffer length matches the current extent and
    /// the field is unlocked; a length mismatch is silently ignored (a
    /// warning is logged, nothing is thrown).
    pub fn set_u(&mut self, data: &[f32]) {
        if self.common.is_locked() {
            return;
        }
        if data.len() != self.u.len() {
            log::warn!(
                "ignoring u channel of length {}, field expects {}",
                data.len(),
                self.u.len()
            );
            return;
        }
        self.u.copy_from_slice(data);
        self.common.notify();
    }

    /// Replaces the whole `v` channel. Same rules as [`set_u`](Self::set_u).
    pub fn set_v(&mut self, data: &[f32]) {
        if self.common.is_locked() {
            return;
        }
        if data.len() != self.v.len() {
            log::warn!(
                "ignoring v channel of length {}, field expects {}",
                data.len(),
                self.v.len()
            );
            return;
        }
        self.v.copy_from_slice(data);
        self.common.notify();
    }
}

impl Vectorfield2D for DenseVectorfield2D {
    fn common(&self) -> &FieldCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut FieldCommon {
        &mut self.common
    }

    fn size(&self) -> usize {
        self.u.len()
    }

    fn clear(&mut self) {
        if self.common.is_locked() {
            return;
        }
        self.u.fill(0.0);
        self.v.fill(0.0);
        self.common.notify();
    }

    fn origin(&self, index: usize) -> Point {
        assert!(
            index < self.size(),
            "index {index} out of range for field of size {}",
            self.size()
        );
        Point::new(self.index_to_x(index) as f64, self.index_to_y(index) as f64)
    }

    fn direction(&self, index: usize) -> Point {
        assert!(
            index < self.size(),
            "index {index} out of range for field of size {}",
            self.size()
        );
        Point::new(self.u[index] as f64, self.v[index] as f64)
    }

    fn set_direction(&mut self, index: usize, direction: Point) {
        if self.common.is_locked() {
            return;
        }
        assert!(
            index < self.size(),
            "index {index} out of range for field of size {}",
            self.size()
        );
        self.u[index] = direction.x as f32;
        self.v[index] = direction.y as f32;
        self.common.notify();
    }

    fn set_size(&mut self, width: usize, height: usize) {
        if self.common.is_locked() {
            return;
        }
        // Destructive reshape: previous values are not preserved.
        let Ok(len) = checked_len(width, height) else {
            log::warn!("ignoring reshape to {width}x{height}: invalid dimensions");
            return;
        };
        self.u = vec![0.0; len];
        self.v = vec![0.0; len];
        self.common.set_extent(width, height);
        self.common.notify();
    }
}

/// A dense field with a per-vector weight channel.
///
/// Composes [`DenseVectorfield2D`] and keeps the extra `w` channel in
/// lockstep with `u` and `v` through every reshape.
#[derive(Debug, Clone)]
pub struct DenseWeightedVectorfield2D {
    field: DenseVectorfield2D,
    w: Vec<f32>,
}

impl DenseWeightedVectorfield2D {
    /// Creates a zero-filled weighted field of the given extent.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        let field = DenseVectorfield2D::new(width, height)?;
        let len = field.size();
        Ok(Self {
            field,
            w: vec![0.0; len],
        })
    }

    /// Creates a weighted field from pre-built channel buffers.
    pub fn from_channels(
        width: usize,
        height: usize,
        u: Vec<f32>,
        v: Vec<f32>,
        w: Vec<f32>,
    ) -> Result<Self, FieldError> {
        let field = DenseVectorfield2D::from_channels(width, height, u, v)?;
        if w.len() != field.size() {
            return Err(FieldError::DimensionMismatch {
                expected: field.size(),
                actual: w.len(),
            });
        }
        Ok(Self { field, w })
    }

    /// Converts grid coordinates to the flat vector index.
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        self.field.index_of(x, y)
    }

    /// The x coordinate of vector `index`.
    pub fn index_to_x(&self, index: usize) -> usize {
        self.field.index_to_x(index)
    }

    /// The y coordinate of vector `index`.
    pub fn index_to_y(&self, index: usize) -> usize {
        self.field.index_to_y(index)
    }

    /// Whether the signed coordinates address a cell inside the grid.
    pub fn is_inside(&self, x: isize, y: isize) -> bool {
        self.field.is_inside(x, y)
    }

    /// The x-displacement channel.
    pub fn u(&self) -> &[f32] {
        self.field.u()
    }

    /// The y-displacement channel.
    pub fn v(&self) -> &[f32] {
        self.field.v()
    }

    /// The weight channel.
    pub fn w(&self) -> &[f32] {
        &self.w
    }

    /// Replaces the whole `u` channel (length must match, unlocked only).
    pub fn set_u(&mut self, data: &[f32]) {
        self.field.set_u(data);
    }

    /// Replaces the whole `v` channel (length must match, unlocked only).
    pub fn set_v(&mut self, data: &[f32]) {
        self.field.set_v(data);
    }

    /// Replaces the whole weight channel. Same silent-mismatch rules as
    /// [`DenseVectorfield2D::set_u`].
    pub fn set_w(&mut self, data: &[f32]) {
        if self.is_locked() {
            return;
        }
        if data.len() != self.w.len() {
            log::warn!(
                "ignoring w channel of length {}, field expects {}",
                data.len(),
                self.w.len()
            );
            return;
        }
        self.w.copy_from_slice(data);
        self.field.common.notify();
    }

    /// Weight of vector `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()`.
    pub fn weight(&self, index: usize) -> f32 {
        assert!(
            index < self.w.len(),
            "index {index} out of range for field of size {}",
            self.w.len()
        );
        self.w[index]
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
            index < self.w.len(),
            "index {index} out of range for field of size {}",
            self.w.len()
        );
        self.w[index] = weight;
        self.field.common.notify();
    }
}

impl Vectorfield2D for DenseWeightedVectorfield2D {
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
        self.w.fill(0.0);
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
        if self.is_locked() {
            return;
        }
        let Ok(len) = checked_len(width, height) else {
            log::warn!("ignoring reshape to {width}x{height}: invalid dimensions");
            return;
        };
        self.w = vec![0.0; len];
        self.field.set_size(width, height);
    }
}
