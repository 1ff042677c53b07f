//! Pure helper functions for extracting typed values from a
//! `serde_json::Value` parameter object.
//!
//! The global-motion transform and the unit scale of a field are owned by an
//! external parameter collaborator; this module is the read surface toward
//! it. Each helper takes a JSON value, a key name, and a default. If the key
//! is missing or the value is not the expected shape, the default is
//! returned. These never fail; they always produce a usable value.

use glam::{DAffine2, DVec2};
use serde_json::Value;

use crate::point::Point;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or
/// wrong type. Accepts both JSON floats and integers.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a point from `params[name]`, expected as a two-element array
/// `[x, y]`. Returns `default` if missing or malformed.
pub fn param_point(params: &Value, name: &str, default: Point) -> Point {
    let Some(arr) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    if arr.len() != 2 {
        return default;
    }
    match (arr[0].as_f64(), arr[1].as_f64()) {
        (Some(x), Some(y)) => Point::new(x, y),
        _ => default,
    }
}

/// Extracts a 2D affine transform from `params[name]`, expected as a 3×3
/// row-major matrix `[[m00, m01, tx], [m10, m11, ty], [0, 0, 1]]`. Only the
/// top two rows are read; the last row is assumed to be `0 0 1`. Returns
/// `default` if missing or malformed.
pub fn param_affine(params: &Value, name: &str, default: DAffine2) -> DAffine2 {
    let Some(rows) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    if rows.len() != 3 {
        return default;
    }
    let mut m = [[0.0_f64; 3]; 2];
    for (r, row) in rows.iter().take(2).enumerate() {
        let Some(cells) = row.as_array() else {
            return default;
        };
        if cells.len() != 3 {
            return default;
        }
        for (c, cell) in cells.iter().enumerate() {
            match cell.as_f64() {
                Some(x) => m[r][c] = x,
                None => return default,
            }
        }
    }
    DAffine2::from_cols(
        DVec2::new(m[0][0], m[1][0]),
        DVec2::new(m[0][1], m[1][1]),
        DVec2::new(m[0][2], m[1][2]),
    )
}

/// Serializes an affine transform back to the 3×3 row-major JSON shape
/// accepted by [`param_affine`]: the write surface toward the parameter
/// collaborator.
pub fn affine_to_json(motion: DAffine2) -> Value {
    let m = motion.matrix2;
    let t = motion.translation;
    serde_json::json!([
        [m.x_axis.x, m.y_axis.x, t.x],
        [m.x_axis.y, m.y_axis.y, t.y],
        [0.0, 0.0, 1.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- param_f64 --

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"scale": 2.5});
        assert!((param_f64(&params, "scale", 1.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_key_missing() {
        let params = json!({"other": 1.0});
        assert!((param_f64(&params, "scale", 3.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_wrong_type() {
        let params = json!({"scale": "large"});
        assert!((param_f64(&params, "scale", 1.0) - 1.0).abs() < f64::EPSILON);
    }

    // -- param_point --

    #[test]
    fn param_point_extracts_two_element_array() {
        let params = json!({"origin": [1.5, -2.0]});
        assert_eq!(
            param_point(&params, "origin", Point::ZERO),
            Point::new(1.5, -2.0)
        );
    }

    #[test]
    fn param_point_rejects_wrong_arity() {
        let params = json!({"origin": [1.0, 2.0, 3.0]});
        assert_eq!(param_point(&params, "origin", Point::ZERO), Point::ZERO);
    }

    #[test]
    fn param_point_rejects_non_numeric_components() {
        let params = json!({"origin": [1.0, "two"]});
        assert_eq!(param_point(&params, "origin", Point::ZERO), Point::ZERO);
    }

    // -- param_affine --

    #[test]
    fn param_affine_reads_a_translation_matrix() {
        let params = json!({"global_motion": [
            [1.0, 0.0, 3.0],
            [0.0, 1.0, -4.0],
            [0.0, 0.0, 1.0],
        ]});
        let m = param_affine(&params, "global_motion", DAffine2::IDENTITY);
        let moved = m.transform_point2(DVec2::ZERO);
        assert!((moved - DVec2::new(3.0, -4.0)).length() < 1e-12);
    }

    #[test]
    fn param_affine_reads_the_linear_part_in_row_major_order() {
        let params = json!({"global_motion": [
            [0.0, -1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ]});
        // 90° rotation: (1, 0) → (0, 1).
        let m = param_affine(&params, "global_motion", DAffine2::IDENTITY);
        let rotated = m.transform_point2(DVec2::new(1.0, 0.0));
        assert!((rotated - DVec2::new(0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn param_affine_returns_default_for_malformed_matrix() {
        let params = json!({"global_motion": [[1.0, 0.0], [0.0, 1.0]]});
        let m = param_affine(&params, "global_motion", DAffine2::IDENTITY);
        assert_eq!(m, DAffine2::IDENTITY);
    }

    #[test]
    fn param_affine_returns_default_when_missing() {
        let params = json!({});
        assert_eq!(
            param_affine(&params, "global_motion", DAffine2::IDENTITY),
            DAffine2::IDENTITY
        );
    }

    #[test]
    fn affine_json_round_trips() {
        let m = DAffine2::from_cols(
            DVec2::new(0.5, 0.1),
            DVec2::new(-0.1, 0.5),
            DVec2::new(7.0, 8.0),
        );
        let back = param_affine(&json!({"m": affine_to_json(m)}), "m", DAffine2::IDENTITY);
        assert_eq!(m, back);
    }
}
