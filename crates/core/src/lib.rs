#![deny(unsafe_code)]
//! Core data model for 2D motion vector fields.
//!
//! Provides the object-safe [`Vectorfield2D`] trait, the dense
//! (array-backed) and sparse (list-backed) field variants with optional
//! per-vector weights and optional alternative directions, the
//! [`BasicStatistics`](stats::BasicStatistics) engines that summarize them,
//! and helpers for reading global-motion/scale values from an external
//! parameter object.

pub mod dense;
pub mod error;
pub mod multi;
pub mod params;
pub mod point;
pub mod sparse;
pub mod stats;
pub mod vectorfield;

pub use dense::{DenseVectorfield2D, DenseWeightedVectorfield2D};
pub use error::FieldError;
pub use multi::{SparseMultiVectorfield2D, SparseWeightedMultiVectorfield2D};
pub use point::Point;
pub use sparse::{SparseVectorfield2D, SparseWeightedVectorfield2D};
pub use stats::{
    BasicStatistics, DenseVectorfield2DStatistics, DenseWeightedVectorfield2DStatistics,
    SparseMultiVectorfield2DStatistics, SparseVectorfield2DStatistics,
    SparseWeightedMultiVectorfield2DStatistics, SparseWeightedVectorfield2DStatistics,
};
pub use vectorfield::{FieldCommon, UpdateCallback, Vectorfield2D, DEFAULT_SCALE};
