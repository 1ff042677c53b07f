#![deny(unsafe_code)]
//! Serialization codec for the vector field data model.
//!
//! Two interchange surfaces over every field variant in
//! `vectorfield-core`:
//!
//! - [`XmlContent`]: lossless XML content, with base64-embedded
//!   little-endian `f32` channels for dense fields and per-vector
//!   `Vector2D` records for sparse fields;
//! - [`CsvContent`]: flat `", "`-separated CSV rows for external tooling.
//!
//! Both surfaces serialize content only; the caller owns the outer
//! container carrying the field's extent and metadata. Reading never
//! resizes a dense field and always refuses a locked destination.

pub mod csv;
pub mod error;
pub mod xml;

pub use csv::CsvContent;
pub use error::CodecError;
pub use xml::XmlContent;
