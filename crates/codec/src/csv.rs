//! Flat CSV interchange format for vector fields.
//!
//! One row per vector, cells separated by `", "`. Column order is
//! `pos_x, pos_y, dir_x, dir_y`, the weighted variants append `weight`, the
//! multi variants append `altN_dir_x, altN_dir_y[, altN_weight]` per stored
//! alternative `N` (0-based). Dense fields use the same row shape with
//! positions produced by the index mapping; reading a dense field requires
//! exactly `width * height` rows and fills the channels in index order,
//! ignoring the position cells.
//!
//! `read_csv` tolerates a leading header line (detected by a non-numeric
//! first cell) and blank lines, and refuses a locked destination.

use std::fmt::Write as _;

use vectorfield_core::{
    DenseVectorfield2D, DenseWeightedVectorfield2D, Point, SparseMultiVectorfield2D,
    SparseVectorfield2D, SparseWeightedMultiVectorfield2D, SparseWeightedVectorfield2D,
    Vectorfield2D,
};

use crate::error::CodecError;

/// Flat CSV serialization of a field's content.
pub trait CsvContent {
    /// The header line matching this field's row shape, without a trailing
    /// newline.
    fn csv_header(&self) -> String;

    /// Serializes the field as CSV rows, one per vector, without a header.
    fn write_csv(&self) -> String;

    /// Replaces the field content from CSV rows, skipping a leading header
    /// line if present.
    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError>;
}

/// Parses every non-empty line into `(line_number, cells)`. A first line
/// whose first cell is not a number is treated as a header and skipped.
fn parse_rows(csv: &str) -> Result<Vec<(usize, Vec<f64>)>, CodecError> {
    let mut rows = Vec::new();
    let mut seen_data = false;
    for (i, raw) in csv.lines().enumerate() {
        let line = i + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let cells: Vec<&str> = raw.split(',').map(str::trim).collect();
        if !seen_data && cells.first().is_some_and(|c| c.parse::<f64>().is_err()) {
            seen_data = true;
            continue;
        }
        seen_data = true;
        let mut values = Vec::with_capacity(cells.len());
        for cell in &cells {
            values.push(cell.parse::<f64>().map_err(|e| CodecError::Csv {
                line,
                reason: format!("invalid number '{cell}': {e}"),
            })?);
        }
        rows.push((line, values));
    }
    log::debug!("parsed {} CSV row(s)", rows.len());
    Ok(rows)
}

fn expect_columns(line: usize, cells: &[f64], expected: usize) -> Result<(), CodecError> {
    if cells.len() != expected {
        return Err(CodecError::Csv {
            line,
            reason: format!("expected {expected} columns, got {}", cells.len()),
        });
    }
    Ok(())
}

/// Derives the alternative count from the first row's column count:
/// `columns = base + per_alt * K`.
fn alternative_count(
    line: usize,
    columns: usize,
    base: usize,
    per_alt: usize,
) -> Result<usize, CodecError> {
    if columns < base || (columns - base) % per_alt != 0 {
        return Err(CodecError::Csv {
            line,
            reason: format!("column count {columns} does not match {base} plus {per_alt} per alternative"),
        });
    }
    Ok((columns - base) / per_alt)
}

fn multi_header(out: &mut String, alternatives: usize, weighted: bool) {
    for a in 0..alternatives {
        let _ = write!(out, ", alt{a}_dir_x, alt{a}_dir_y");
        if weighted {
            let _ = write!(out, ", alt{a}_weight");
        }
    }
}

impl CsvContent for DenseVectorfield2D {
    fn csv_header(&self) -> String {
        "pos_x, pos_y, dir_x, dir_y".into()
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for idx in 0..self.size() {
            let _ = writeln!(
                out,
                "{}, {}, {}, {}",
                self.index_to_x(idx),
                self.index_to_y(idx),
                self.u()[idx],
                self.v()[idx]
            );
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        if rows.len() != self.size() {
            return Err(CodecError::Malformed(format!(
                "expected {} rows, got {}",
                self.size(),
                rows.len()
            )));
        }
        let mut u = Vec::with_capacity(rows.len());
        let mut v = Vec::with_capacity(rows.len());
        for (line, cells) in &rows {
            expect_columns(*line, cells, 4)?;
            u.push(cells[2] as f32);
            v.push(cells[3] as f32);
        }
        self.set_u(&u);
        self.set_v(&v);
        Ok(())
    }
}

impl CsvContent for DenseWeightedVectorfield2D {
    fn csv_header(&self) -> String {
        "pos_x, pos_y, dir_x, dir_y, weight".into()
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for idx in 0..self.size() {
            let _ = writeln!(
                out,
                "{}, {}, {}, {}, {}",
                self.index_to_x(idx),
                self.index_to_y(idx),
                self.u()[idx],
                self.v()[idx],
                self.w()[idx]
            );
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        if rows.len() != self.size() {
            return Err(CodecError::Malformed(format!(
                "expected {} rows, got {}",
                self.size(),
                rows.len()
            )));
        }
        let mut u = Vec::with_capacity(rows.len());
        let mut v = Vec::with_capacity(rows.len());
        let mut w = Vec::with_capacity(rows.len());
        for (line, cells) in &rows {
            expect_columns(*line, cells, 5)?;
            u.push(cells[2] as f32);
            v.push(cells[3] as f32);
            w.push(cells[4] as f32);
        }
        self.set_u(&u);
        self.set_v(&v);
        self.set_w(&w);
        Ok(())
    }
}

impl CsvContent for SparseVectorfield2D {
    fn csv_header(&self) -> String {
        "pos_x, pos_y, dir_x, dir_y".into()
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            let o = self.origin(i);
            let d = self.direction(i);
            let _ = writeln!(out, "{}, {}, {}, {}", o.x, o.y, d.x, d.y);
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        self.clear();
        for (line, cells) in &rows {
            expect_columns(*line, cells, 4)?;
            self.add_vector(Point::new(cells[0], cells[1]), Point::new(cells[2], cells[3]));
        }
        Ok(())
    }
}

impl CsvContent for SparseWeightedVectorfield2D {
    fn csv_header(&self) -> String {
        "pos_x, pos_y, dir_x, dir_y, weight".into()
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            let o = self.origin(i);
            let d = self.direction(i);
            let _ = writeln!(out, "{}, {}, {}, {}, {}", o.x, o.y, d.x, d.y, self.weight(i));
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        self.clear();
        for (line, cells) in &rows {
            expect_columns(*line, cells, 5)?;
            self.add_weighted_vector(
                Point::new(cells[0], cells[1]),
                Point::new(cells[2], cells[3]),
                cells[4] as f32,
            );
        }
        Ok(())
    }
}

impl CsvContent for SparseMultiVectorfield2D {
    fn csv_header(&self) -> String {
        let mut out = String::from("pos_x, pos_y, dir_x, dir_y");
        multi_header(&mut out, self.alternatives(), false);
        out
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            let o = self.origin(i);
            let d = self.direction(i);
            let _ = write!(out, "{}, {}, {}, {}", o.x, o.y, d.x, d.y);
            for alt in self.alt_directions(i) {
                let _ = write!(out, ", {}, {}", alt.x, alt.y);
            }
            out.push('\n');
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        let k = match rows.first() {
            Some((line, cells)) => alternative_count(*line, cells.len(), 4, 2)?,
            None => 0,
        };
        self.clear();
        self.set_alternatives(k);
        for (line, cells) in &rows {
            expect_columns(*line, cells, 4 + 2 * k)?;
            let mut alts = Vec::with_capacity(k);
            for a in 0..k {
                alts.push(Point::new(cells[4 + 2 * a], cells[5 + 2 * a]));
            }
            self.add_vector_with_alternatives(
                Point::new(cells[0], cells[1]),
                Point::new(cells[2], cells[3]),
                alts,
            );
        }
        Ok(())
    }
}

impl CsvContent for SparseWeightedMultiVectorfield2D {
    fn csv_header(&self) -> String {
        let mut out = String::from("pos_x, pos_y, dir_x, dir_y, weight");
        multi_header(&mut out, self.alternatives(), true);
        out
    }

    fn write_csv(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            let o = self.origin(i);
            let d = self.direction(i);
            let _ = write!(out, "{}, {}, {}, {}, {}", o.x, o.y, d.x, d.y, self.weight(i));
            for (a, alt) in self.alt_directions(i).iter().enumerate() {
                let _ = write!(out, ", {}, {}, {}", alt.x, alt.y, self.alt_weights(i)[a]);
            }
            out.push('\n');
        }
        out
    }

    fn read_csv(&mut self, csv: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let rows = parse_rows(csv)?;
        let k = match rows.first() {
            Some((line, cells)) => alternative_count(*line, cells.len(), 5, 3)?,
            None => 0,
        };
        self.clear();
        self.set_alternatives(k);
        for (line, cells) in &rows {
            expect_columns(*line, cells, 5 + 3 * k)?;
            self.add_weighted_vector(
                Point::new(cells[0], cells[1]),
                Point::new(cells[2], cells[3]),
                cells[4] as f32,
            );
            let index = self.size() - 1;
            for a in 0..k {
                let direction = Point::new(cells[5 + 3 * a], cells[6 + 3 * a]);
                self.set_alt_direction(index, a, direction);
                self.set_alt_weight(index, a, cells[7 + 3 * a] as f32);
            }
        }
        Ok(())
    }
}
