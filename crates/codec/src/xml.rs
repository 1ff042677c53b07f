//! XML content encoding for vector fields.
//!
//! Dense fields serialize as one `Channel` container per array: the raw
//! little-endian `f32` buffer in row-major order, base64-encoded, tagged
//! with the channel ID (`u`, `v`, `w`). Sparse fields serialize as a
//! sequence of `Vector2D` records with decimal-text children; alternative
//! directions nest as `altDirection` elements whose `ID` attribute is
//! 1-based on the wire (stored alternative `a` is written as `ID = a + 1`).
//!
//! Reading requires the destination's extent to be set beforehand (dense)
//! and refuses a locked destination. It aborts on the first error; anything
//! already written to the field stays, so the field's state is then
//! undefined and the caller must discard it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Display;
use std::fmt::Write as _;

use vectorfield_core::{
    DenseVectorfield2D, DenseWeightedVectorfield2D, Point, SparseMultiVectorfield2D,
    SparseVectorfield2D, SparseWeightedMultiVectorfield2D, SparseWeightedVectorfield2D,
    Vectorfield2D,
};

use crate::error::CodecError;

/// Lossless XML content serialization of a field's vectors/channels.
///
/// `write_xml` produces the field's content (the caller wraps it in its own
/// container carrying the extent); `read_xml` fills an existing field whose
/// extent is already set.
pub trait XmlContent {
    /// Serializes the field content.
    fn write_xml(&self) -> String;

    /// Replaces the field content from its XML serialization.
    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError>;
}

// -- Dense channels --

fn write_channel(out: &mut String, id: &str, data: &[f32]) {
    let mut bytes = Vec::with_capacity(data.len() * 4);
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    let body = STANDARD.encode(&bytes);
    let _ = write!(out, "<Channel ID=\"{id}\" Encoding=\"Base64\">{body}</Channel>");
}

/// Parses every `Channel` container, decoding and length-checking its body
/// against `expected_values` f32 values.
fn parse_channels(
    xml: &str,
    expected_values: usize,
) -> Result<Vec<(String, Vec<f32>)>, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut channels = Vec::new();
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Channel" => {
                let mut id = None;
                let mut encoding = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"ID" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Encoding" => encoding = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                let id = id.ok_or_else(|| CodecError::MissingAttribute { name: "ID".into() })?;
                if !matches!(id.as_str(), "u" | "v" | "w") {
                    return Err(CodecError::UnknownChannel { id });
                }
                match encoding.as_deref() {
                    Some("Base64") => {}
                    other => {
                        return Err(CodecError::UnsupportedEncoding {
                            encoding: other.unwrap_or_default().to_string(),
                        })
                    }
                }
                current = Some((id, String::new()));
            }
            Event::Text(t) => {
                if let Some((_, body)) = current.as_mut() {
                    body.push_str(t.unescape()?.trim());
                }
            }
            Event::End(e) if e.name().as_ref() == b"Channel" => {
                if let Some((id, body)) = current.take() {
                    let bytes = STANDARD.decode(body.as_bytes())?;
                    let expected = expected_values * 4;
                    if bytes.len() != expected {
                        return Err(CodecError::ChannelSize {
                            id,
                            expected,
                            actual: bytes.len(),
                        });
                    }
                    let values = bytes
                        .chunks_exact(4)
                        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                        .collect();
                    channels.push((id, values));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    log::debug!("parsed {} channel(s) of {expected_values} values", channels.len());
    Ok(channels)
}

fn channel<'a>(channels: &'a [(String, Vec<f32>)], id: &str) -> Result<&'a [f32], CodecError> {
    channels
        .iter()
        .find(|(cid, _)| cid == id)
        .map(|(_, data)| data.as_slice())
        .ok_or_else(|| CodecError::MissingElement {
            name: format!("Channel ID=\"{id}\""),
        })
}

impl XmlContent for DenseVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        write_channel(&mut out, "u", self.u());
        out.push('\n');
        write_channel(&mut out, "v", self.v());
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let channels = parse_channels(xml, self.size())?;
        let u = channel(&channels, "u")?.to_vec();
        let v = channel(&channels, "v")?.to_vec();
        self.set_u(&u);
        self.set_v(&v);
        Ok(())
    }
}

impl XmlContent for DenseWeightedVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        write_channel(&mut out, "u", self.u());
        out.push('\n');
        write_channel(&mut out, "v", self.v());
        out.push('\n');
        write_channel(&mut out, "w", self.w());
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let channels = parse_channels(xml, self.size())?;
        let u = channel(&channels, "u")?.to_vec();
        let v = channel(&channels, "v")?.to_vec();
        let w = channel(&channels, "w")?.to_vec();
        self.set_u(&u);
        self.set_v(&v);
        self.set_w(&w);
        Ok(())
    }
}

// -- Sparse records --

fn leaf<T: Display>(out: &mut String, tag: &str, value: T) {
    let _ = write!(out, "<{tag}>{value}</{tag}>");
}

fn write_vector(
    out: &mut String,
    id: usize,
    origin: Point,
    direction: Point,
    weight: Option<f32>,
    alternatives: Option<(&[Point], Option<&[f32]>)>,
) {
    let _ = write!(out, "<Vector2D ID=\"{id}\">");
    leaf(out, "x", origin.x);
    leaf(out, "y", origin.y);
    leaf(out, "u", direction.x);
    leaf(out, "v", direction.y);
    if let Some(w) = weight {
        leaf(out, "w", w);
    }
    if let Some((alts, alt_weights)) = alternatives {
        leaf(out, "altDirections", alts.len());
        for (a, alt) in alts.iter().enumerate() {
            // 1-based IDs on the wire.
            let _ = write!(out, "<altDirection ID=\"{}\">", a + 1);
            leaf(out, "u", alt.x);
            leaf(out, "v", alt.y);
            if let Some(weights) = alt_weights {
                leaf(out, "w", weights[a]);
            }
            out.push_str("</altDirection>");
        }
    }
    out.push_str("</Vector2D>");
}

#[derive(Debug, Default)]
struct RawAlt {
    u: Option<f64>,
    v: Option<f64>,
    w: Option<f64>,
}

#[derive(Debug, Default)]
struct RawVector {
    x: Option<f64>,
    y: Option<f64>,
    u: Option<f64>,
    v: Option<f64>,
    w: Option<f64>,
    declared_alts: Option<usize>,
    alts: Vec<RawAlt>,
}

impl RawVector {
    fn origin(&self) -> Result<Point, CodecError> {
        Ok(Point::new(require(self.x, "x")?, require(self.y, "y")?))
    }

    fn direction(&self) -> Result<Point, CodecError> {
        Ok(Point::new(require(self.u, "u")?, require(self.v, "v")?))
    }
}

fn require(value: Option<f64>, name: &str) -> Result<f64, CodecError> {
    value.ok_or_else(|| CodecError::MissingElement { name: name.into() })
}

/// Parses a sequence of `Vector2D` records. Record order is authoritative;
/// `ID` attributes are carried for diagnostics only.
fn parse_vectors(xml: &str) -> Result<Vec<RawVector>, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut records: Vec<RawVector> = Vec::new();
    let mut current: Option<RawVector> = None;
    let mut in_alt = false;
    let mut tag: Option<Vec<u8>> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"Vector2D" => {
                    current = Some(RawVector::default());
                    in_alt = false;
                }
                b"altDirection" => {
                    let record = current.as_mut().ok_or_else(|| {
                        CodecError::Malformed("altDirection outside Vector2D".into())
                    })?;
                    record.alts.push(RawAlt::default());
                    in_alt = true;
                }
                name => tag = Some(name.to_vec()),
            },
            Event::Text(t) => {
                let text = t.unescape()?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let Some(tag_name) = tag.as_deref() else {
                    continue;
                };
                let record = current
                    .as_mut()
                    .ok_or_else(|| CodecError::Malformed("text outside Vector2D".into()))?;
                if in_alt {
                    if let Some(alt) = record.alts.last_mut() {
                        match tag_name {
                            b"u" => alt.u = Some(text.parse()?),
                            b"v" => alt.v = Some(text.parse()?),
                            b"w" => alt.w = Some(text.parse()?),
                            _ => {}
                        }
                    }
                } else {
                    match tag_name {
                        b"x" => record.x = Some(text.parse()?),
                        b"y" => record.y = Some(text.parse()?),
                        b"u" => record.u = Some(text.parse()?),
                        b"v" => record.v = Some(text.parse()?),
                        b"w" => record.w = Some(text.parse()?),
                        b"altDirections" => record.declared_alts = Some(text.parse()?),
                        _ => {}
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"Vector2D" => {
                    let record = current.take().ok_or_else(|| {
                        CodecError::Malformed("unmatched Vector2D end tag".into())
                    })?;
                    if let Some(declared) = record.declared_alts {
                        if declared != record.alts.len() {
                            return Err(CodecError::Malformed(format!(
                                "record {} declares {declared} alternatives but carries {}",
                                records.len(),
                                record.alts.len()
                            )));
                        }
                    }
                    records.push(record);
                }
                b"altDirection" => in_alt = false,
                _ => tag = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }
    log::debug!("parsed {} vector record(s)", records.len());
    Ok(records)
}

/// Checks that every record carries the same number of alternatives and
/// returns that count.
fn uniform_alternative_count(records: &[RawVector]) -> Result<usize, CodecError> {
    let k = records.first().map(|r| r.alts.len()).unwrap_or(0);
    for (i, record) in records.iter().enumerate() {
        if record.alts.len() != k {
            return Err(CodecError::Malformed(format!(
                "record {i} has {} alternatives, expected {k}",
                record.alts.len()
            )));
        }
    }
    Ok(k)
}

impl XmlContent for SparseVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            write_vector(&mut out, i, self.origin(i), self.direction(i), None, None);
            out.push('\n');
        }
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let records = parse_vectors(xml)?;
        self.clear();
        for record in &records {
            self.add_vector(record.origin()?, record.direction()?);
        }
        Ok(())
    }
}

impl XmlContent for SparseWeightedVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            write_vector(
                &mut out,
                i,
                self.origin(i),
                self.direction(i),
                Some(self.weight(i)),
                None,
            );
            out.push('\n');
        }
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let records = parse_vectors(xml)?;
        self.clear();
        for record in &records {
            let weight = require(record.w, "w")? as f32;
            self.add_weighted_vector(record.origin()?, record.direction()?, weight);
        }
        Ok(())
    }
}

impl XmlContent for SparseMultiVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            write_vector(
                &mut out,
                i,
                self.origin(i),
                self.direction(i),
                None,
                Some((self.alt_directions(i), None)),
            );
            out.push('\n');
        }
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let records = parse_vectors(xml)?;
        let k = uniform_alternative_count(&records)?;
        self.clear();
        self.set_alternatives(k);
        for record in &records {
            let mut alts = Vec::with_capacity(k);
            for alt in &record.alts {
                alts.push(Point::new(require(alt.u, "u")?, require(alt.v, "v")?));
            }
            self.add_vector_with_alternatives(record.origin()?, record.direction()?, alts);
        }
        Ok(())
    }
}

impl XmlContent for SparseWeightedMultiVectorfield2D {
    fn write_xml(&self) -> String {
        let mut out = String::new();
        for i in 0..self.size() {
            write_vector(
                &mut out,
                i,
                self.origin(i),
                self.direction(i),
                Some(self.weight(i)),
                Some((self.alt_directions(i), Some(self.alt_weights(i)))),
            );
            out.push('\n');
        }
        out
    }

    fn read_xml(&mut self, xml: &str) -> Result<(), CodecError> {
        if self.is_locked() {
            return Err(CodecError::Locked);
        }
        let records = parse_vectors(xml)?;
        let k = uniform_alternative_count(&records)?;
        self.clear();
        self.set_alternatives(k);
        for record in &records {
            let weight = require(record.w, "w")? as f32;
            self.add_weighted_vector(record.origin()?, record.direction()?, weight);
            let index = self.size() - 1;
            for (a, alt) in record.alts.iter().enumerate() {
                let direction = Point::new(require(alt.u, "u")?, require(alt.v, "v")?);
                self.set_alt_direction(index, a, direction);
                self.set_alt_weight(index, a, require(alt.w, "w")? as f32);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random channel values.
    fn lcg_channel(seed: u32, n: usize) -> Vec<f32> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 16) as f32
            })
            .collect()
    }

    // -- Dense round trips --

    #[test]
    fn dense_round_trip_is_bit_exact() {
        let u = lcg_channel(1, 12);
        let v = lcg_channel(2, 12);
        let field = DenseVectorfield2D::from_channels(4, 3, u.clone(), v.clone()).unwrap();

        let xml = field.write_xml();
        let mut restored = DenseVectorfield2D::new(4, 3).unwrap();
        restored.read_xml(&xml).unwrap();

        assert_eq!(restored.u(), &u[..], "u channel must round-trip bit-for-bit");
        assert_eq!(restored.v(), &v[..], "v channel must round-trip bit-for-bit");
    }

    #[test]
    fn dense_weighted_round_trip_includes_the_w_channel() {
        let field = DenseWeightedVectorfield2D::from_channels(
            2,
            2,
            lcg_channel(3, 4),
            lcg_channel(4, 4),
            lcg_channel(5, 4),
        )
        .unwrap();

        let xml = field.write_xml();
        assert!(xml.contains("<Channel ID=\"w\" Encoding=\"Base64\">"));

        let mut restored = DenseWeightedVectorfield2D::new(2, 2).unwrap();
        restored.read_xml(&xml).unwrap();
        assert_eq!(restored.w(), field.w());
    }

    // -- Dense error cases --

    #[test]
    fn unknown_channel_id_is_rejected() {
        let mut out = String::new();
        write_channel(&mut out, "u", &[0.0; 4]);
        let out = out.replace("ID=\"u\"", "ID=\"q\"");
        let mut field = DenseVectorfield2D::new(2, 2).unwrap();
        assert!(matches!(
            field.read_xml(&out),
            Err(CodecError::UnknownChannel { id }) if id == "q"
        ));
    }

    #[test]
    fn wrong_byte_length_is_a_hard_failure() {
        let mut out = String::new();
        write_channel(&mut out, "u", &[0.0; 5]);
        write_channel(&mut out, "v", &[0.0; 5]);
        let mut field = DenseVectorfield2D::new(2, 2).unwrap();
        assert!(matches!(
            field.read_xml(&out),
            Err(CodecError::ChannelSize { expected: 16, actual: 20, .. })
        ));
    }

    #[test]
    fn missing_channel_is_reported() {
        let mut out = String::new();
        write_channel(&mut out, "u", &[0.0; 4]);
        let mut field = DenseVectorfield2D::new(2, 2).unwrap();
        assert!(matches!(
            field.read_xml(&out),
            Err(CodecError::MissingElement { .. })
        ));
    }

    #[test]
    fn channel_without_id_attribute_is_rejected() {
        let xml = "<Channel Encoding=\"Base64\">AAAAAA==</Channel>";
        let mut field = DenseVectorfield2D::new(2, 2).unwrap();
        assert!(matches!(
            field.read_xml(xml),
            Err(CodecError::MissingAttribute { name }) if name == "ID"
        ));
    }

    #[test]
    fn non_base64_encoding_is_rejected() {
        let xml = "<Channel ID=\"u\" Encoding=\"Hex\">00</Channel>";
        let mut field = DenseVectorfield2D::new(2, 2).unwrap();
        assert!(matches!(
            field.read_xml(xml),
            Err(CodecError::UnsupportedEncoding { encoding }) if encoding == "Hex"
        ));
    }

    #[test]
    fn locked_destination_is_refused() {
        let field = DenseVectorfield2D::new(2, 2).unwrap();
        let xml = field.write_xml();
        let mut destination = DenseVectorfield2D::new(2, 2).unwrap();
        destination.set_locked(true);
        assert!(matches!(destination.read_xml(&xml), Err(CodecError::Locked)));
    }

    // -- Sparse records --

    #[test]
    fn sparse_weighted_record_has_the_documented_shape() {
        let mut field = SparseWeightedVectorfield2D::new(10, 10);
        field.add_weighted_vector(Point::new(1.0, 2.0), Point::new(0.5, -0.5), 3.0);
        let xml = field.write_xml();
        assert_eq!(
            xml.trim(),
            "<Vector2D ID=\"0\"><x>1</x><y>2</y><u>0.5</u><v>-0.5</v><w>3</w></Vector2D>"
        );
    }

    #[test]
    fn sparse_round_trip_preserves_origins_and_directions() {
        let mut field = SparseVectorfield2D::new(10, 10);
        field.add_vector(Point::new(1.25, 2.5), Point::new(-0.75, 0.125));
        field.add_vector(Point::new(3.0, 4.0), Point::new(0.1, 0.2));

        let mut restored = SparseVectorfield2D::new(10, 10);
        restored.read_xml(&field.write_xml()).unwrap();

        assert_eq!(restored.size(), 2);
        assert_eq!(restored.origin(0), Point::new(1.25, 2.5));
        assert_eq!(restored.direction(0), Point::new(-0.75, 0.125));
        assert_eq!(restored.direction(1), Point::new(0.1, 0.2));
    }

    #[test]
    fn sparse_weighted_read_requires_the_weight_element() {
        let xml = "<Vector2D ID=\"0\"><x>1</x><y>2</y><u>3</u><v>4</v></Vector2D>";
        let mut field = SparseWeightedVectorfield2D::new(10, 10);
        assert!(matches!(
            field.read_xml(xml),
            Err(CodecError::MissingElement { name }) if name == "w"
        ));
    }

    // -- Multi records --

    #[test]
    fn alt_direction_ids_are_one_based_on_the_wire() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::ZERO, Point::ZERO);
        let xml = field.write_xml();
        assert!(xml.contains("<altDirections>2</altDirections>"));
        assert!(xml.contains("<altDirection ID=\"1\">"));
        assert!(xml.contains("<altDirection ID=\"2\">"));
        assert!(!xml.contains("<altDirection ID=\"0\">"));
    }

    #[test]
    fn multi_round_trip_preserves_alternatives() {
        let mut field = SparseMultiVectorfield2D::new(10, 10, 2);
        field.add_vector(Point::new(1.0, 1.0), Point::new(0.5, 0.5));
        field.set_alt_direction(0, 0, Point::new(-1.0, 0.25));
        field.set_alt_direction(0, 1, Point::new(2.0, -2.0));

        let mut restored = SparseMultiVectorfield2D::new(10, 10, 0);
        restored.read_xml(&field.write_xml()).unwrap();

        assert_eq!(restored.alternatives(), 2);
        assert_eq!(restored.alt_direction(0, 0), Point::new(-1.0, 0.25));
        assert_eq!(restored.alt_direction(0, 1), Point::new(2.0, -2.0));
        assert_eq!(restored.direction(0), Point::new(0.5, 0.5));
    }

    #[test]
    fn declared_alternative_count_must_match_the_records() {
        let xml = "<Vector2D ID=\"0\"><x>0</x><y>0</y><u>0</u><v>0</v>\
                   <altDirections>2</altDirections>\
                   <altDirection ID=\"1\"><u>1</u><v>1</v></altDirection></Vector2D>";
        let mut field = SparseMultiVectorfield2D::new(10, 10, 0);
        assert!(matches!(field.read_xml(xml), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn weighted_multi_round_trip_preserves_weights_everywhere() {
        let mut field = SparseWeightedMultiVectorfield2D::new(10, 10, 1);
        field.add_weighted_vector(Point::new(1.0, 2.0), Point::new(3.0, 4.0), 0.5);
        field.set_alt_direction(0, 0, Point::new(5.0, 6.0));
        field.set_alt_weight(0, 0, 0.25);

        let mut restored = SparseWeightedMultiVectorfield2D::new(10, 10, 0);
        restored.read_xml(&field.write_xml()).unwrap();

        assert_eq!(restored.weight(0), 0.5);
        assert_eq!(restored.alt_weight(0, 0), 0.25);
        assert_eq!(restored.alt_direction(0, 0), Point::new(5.0, 6.0));
    }

    #[test]
    fn empty_content_yields_an_empty_field() {
        let mut field = SparseVectorfield2D::new(10, 10);
        field.add_vector(Point::ZERO, Point::ZERO);
        field.read_xml("").unwrap();
        assert_eq!(field.size(), 0);
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f64> {
            -1000.0_f64..1000.0
        }

        proptest! {
            #[test]
            fn sparse_xml_round_trips_arbitrary_vectors(
                vectors in prop::collection::vec((coord(), coord(), coord(), coord()), 0..16)
            ) {
                let mut field = SparseVectorfield2D::new(100, 100);
                for (x, y, u, v) in &vectors {
                    field.add_vector(Point::new(*x, *y), Point::new(*u, *v));
                }
                let mut restored = SparseVectorfield2D::new(100, 100);
                restored.read_xml(&field.write_xml()).unwrap();
                prop_assert_eq!(restored.size(), field.size());
                for i in 0..field.size() {
                    prop_assert_eq!(restored.origin(i), field.origin(i));
                    prop_assert_eq!(restored.direction(i), field.direction(i));
                }
            }

            #[test]
            fn dense_xml_round_trips_arbitrary_channels(seed in 0_u32..10_000) {
                let u = lcg_channel(seed, 6);
                let v = lcg_channel(seed ^ 0xFFFF, 6);
                let field = DenseVectorfield2D::from_channels(3, 2, u, v).unwrap();
                let mut restored = DenseVectorfield2D::new(3, 2).unwrap();
                restored.read_xml(&field.write_xml()).unwrap();
                prop_assert_eq!(restored.u(), field.u());
                prop_assert_eq!(restored.v(), field.v());
            }
        }
    }
}
