//! The common `Vectorfield2D` contract shared by every field variant.
//!
//! The trait is object-safe so fields can be handled as `dyn Vectorfield2D`
//! for runtime switching between storage strategies (dense arrays vs.
//! sparse vector lists).
//!
//! Every variant embeds a [`FieldCommon`]: the extent, the global-motion
//! transform, the unit scale, the advisory lock flag, and an optional update
//! callback. The lock is cooperative: mutators check it first and return
//! silently while it is held. The callback stands in for the owning model;
//! it is invoked once after every successful mutation.

use std::fmt;
use std::rc::Rc;

use glam::{DAffine2, DVec2};

use crate::point::Point;

/// Default unit conversion factor for new fields.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Callback invoked after every successful mutation of a field.
pub type UpdateCallback = Rc<dyn Fn()>;

/// State shared by all field variants.
#[derive(Clone)]
pub struct FieldCommon {
    width: usize,
    height: usize,
    global_motion: DAffine2,
    scale: f64,
    locked: bool,
    on_update: Option<UpdateCallback>,
}

impl FieldCommon {
    /// Creates shared state for a field of the given extent.
    ///
    /// Global motion defaults to the identity transform, scale to
    /// [`DEFAULT_SCALE`], and the field starts unlocked with no callback.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            global_motion: DAffine2::IDENTITY,
            scale: DEFAULT_SCALE,
            locked: false,
            on_update: None,
        }
    }

    /// Field width in cells/pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells/pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Records a new extent. Storage synchronization is the owning field's job.
    pub fn set_extent(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// The affine transform describing bulk motion shared by the whole field.
    pub fn global_motion(&self) -> DAffine2 {
        self.global_motion
    }

    /// Replaces the global-motion transform. Not lock-gated; gating happens
    /// in [`Vectorfield2D::set_global_motion`].
    pub fn set_global_motion(&mut self, motion: DAffine2) {
        self.global_motion = motion;
    }

    /// Unit conversion factor (e.g. cm per pixel).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Replaces the unit conversion factor. Not lock-gated.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Whether the advisory lock is held.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sets or releases the advisory lock. The lock itself is not gated.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Installs (or removes) the update callback.
    pub fn set_on_update(&mut self, callback: Option<UpdateCallback>) {
        self.on_update = callback;
    }

    /// Invokes the update callback, if one is installed.
    pub fn notify(&self) {
        if let Some(cb) = &self.on_update {
            cb();
        }
    }
}

impl fmt::Debug for FieldCommon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCommon")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("global_motion", &self.global_motion)
            .field("scale", &self.scale)
            .field("locked", &self.locked)
            .field("on_update", &self.on_update.as_ref().map(|_| "Fn"))
            .finish()
    }
}

/// Common contract for 2D motion vector fields.
///
/// A field holds `size()` vectors; vector `i` starts at `origin(i)` and is
/// displaced by `direction(i)`. The direction decomposes into a global part
/// derived from the global-motion transform and a residual local part:
///
/// `direction(i) == global_direction(i) + local_direction(i)`
///
/// where `global_direction(i) = global_motion * origin(i) - origin(i)`.
/// The local part is never stored, always derived.
///
/// This trait is **object-safe**: `Box<dyn Vectorfield2D>` and
/// `&dyn Vectorfield2D` work for runtime polymorphism over storage
/// strategies.
pub trait Vectorfield2D {
    /// Shared state (extent, global motion, scale, lock, callback).
    fn common(&self) -> &FieldCommon;

    /// Mutable shared state.
    fn common_mut(&mut self) -> &mut FieldCommon;

    /// Number of vectors in the field.
    fn size(&self) -> usize;

    /// Removes all vectors (sparse) or zeroes all channels (dense).
    /// No-op while locked.
    fn clear(&mut self);

    /// The position vector `index` starts at.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()`.
    fn origin(&self, index: usize) -> Point;

    /// The displacement of vector `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()`.
    fn direction(&self, index: usize) -> Point;

    /// Replaces the displacement of vector `index`. No-op while locked.
    ///
    /// # Panics
    ///
    /// Panics if `index >= size()` (and the field is unlocked).
    fn set_direction(&mut self, index: usize, direction: Point);

    /// Changes the field extent. Dense variants reallocate their channels
    /// destructively (previous values are lost) and silently ignore an
    /// extent they could not be constructed with; sparse variants only
    /// record the new extent. No-op while locked.
    fn set_size(&mut self, width: usize, height: usize);

    /// Field width in cells/pixels.
    fn width(&self) -> usize {
        self.common().width()
    }

    /// Field height in cells/pixels.
    fn height(&self) -> usize {
        self.common().height()
    }

    /// Whether the advisory lock is held. While locked, every mutator is a
    /// silent no-op; callers that need to know must check here.
    fn is_locked(&self) -> bool {
        self.common().is_locked()
    }

    /// Sets or releases the advisory lock.
    fn set_locked(&mut self, locked: bool) {
        self.common_mut().set_locked(locked);
    }

    /// Unit conversion factor.
    fn scale(&self) -> f64 {
        self.common().scale()
    }

    /// Replaces the unit conversion factor. No-op while locked.
    fn set_scale(&mut self, scale: f64) {
        if self.is_locked() {
            return;
        }
        self.common_mut().set_scale(scale);
        self.common().notify();
    }

    /// The global-motion affine transform.
    fn global_motion(&self) -> DAffine2 {
        self.common().global_motion()
    }

    /// Replaces the global-motion transform. No-op while locked.
    fn set_global_motion(&mut self, motion: DAffine2) {
        if self.is_locked() {
            return;
        }
        self.common_mut().set_global_motion(motion);
        self.common().notify();
    }

    /// The part of `direction(index)` explained by the global motion:
    /// `global_motion * origin(index) - origin(index)`.
    fn global_direction(&self, index: usize) -> Point {
        let origin: DVec2 = self.origin(index).into();
        Point::from(self.global_motion().transform_point2(origin) - origin)
    }

    /// The residual part of `direction(index)` not explained by the global
    /// motion. Derived, never stored.
    fn local_direction(&self, index: usize) -> Point {
        self.direction(index) - self.global_direction(index)
    }

    /// Length of vector `index`.
    fn length(&self, index: usize) -> f64 {
        self.direction(index).length()
    }

    /// Squared length of vector `index`.
    fn squared_length(&self, index: usize) -> f64 {
        self.direction(index).squared_length()
    }

    /// Angle of vector `index` in degrees in `[0, 360)`.
    fn angle(&self, index: usize) -> f64 {
        self.direction(index).angle()
    }

    /// End point of vector `index`: `origin(index) + direction(index)`.
    fn target(&self, index: usize) -> Point {
        self.origin(index) + self.direction(index)
    }

    /// Moves the end point of vector `index` by adjusting its direction.
    /// No-op while locked.
    fn set_target(&mut self, index: usize, target: Point) {
        if self.is_locked() {
            return;
        }
        let origin = self.origin(index);
        self.set_direction(index, target - origin);
    }
}
