//! Persistence codec - compact, versioned snapshots of a world.
//!
//! Every buffer is independently run-length encoded as a flat alternating
//! `(value, count)` sequence, falling back to a verbatim `raw` encoding
//! whenever RLE would not shrink the data. The whole record is JSON
//! serializable.
//!
//! Error policy follows the engine taxonomy: malformed *inputs* to
//! `serialize` are caller bugs and fail fast; malformed *payloads* handed to
//! `deserialize` are data errors and recover locally - a `None` result plus
//! a log line, with absent or damaged buffer fields decoded as zero-filled
//! rather than failing the whole restore.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::world::World;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Longest representable run in an RLE pair.
const RUN_MAX: i64 = u32::MAX as i64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("world dimensions must be positive")]
    BadDimensions,
    #[error("cell buffer length {len} does not match {expected} cells")]
    LengthMismatch { len: usize, expected: usize },
}

/// Per-buffer encoding kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    Rle,
}

/// One encoded buffer. `rle` data is `value, count, value, count, ...`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Field {
    pub encoding: Encoding,
    #[serde(default, deserialize_with = "lenient_i64_seq")]
    pub data: Vec<i64>,
}

/// Versioned snapshot record. Optional buffers are present only when their
/// source length matched the cell count at serialize time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(deserialize_with = "lenient_dim")]
    pub width: u32,
    #[serde(deserialize_with = "lenient_dim")]
    pub height: u32,
    pub cells: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move_dir: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetimes: Option<Field>,
}

/// A record with no version field is a legacy v1 snapshot.
fn legacy_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Accept any JSON number for a dimension, truncating toward zero and
/// clamping negatives to 0.
fn lenient_dim<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(de)?;
    if !v.is_finite() || v <= 0.0 {
        return Ok(0);
    }
    Ok(v.trunc().min(u32::MAX as f64) as u32)
}

/// Accept a sequence of arbitrary JSON values, coercing non-numeric entries
/// to 0 instead of failing the whole field.
fn lenient_i64_seq<'de, D>(de: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(de)?;
    Ok(raw
        .into_iter()
        .map(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.trunc() as i64)).unwrap_or(0))
        .collect())
}

/// Encode a world into a snapshot record.
pub fn serialize(world: &World) -> Result<Snapshot, CodecError> {
    if world.width() == 0 || world.height() == 0 {
        return Err(CodecError::BadDimensions);
    }
    let expected = (world.width() as usize) * (world.height() as usize);
    if world.cells.len() != expected {
        return Err(CodecError::LengthMismatch {
            len: world.cells.len(),
            expected,
        });
    }

    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        width: world.width(),
        height: world.height(),
        cells: encode_buffer(world.cells.iter().map(|&v| v as i64)),
        flags: optional_buffer(world.flags.iter().map(|&v| v as i64), expected, world.flags.len()),
        last_move_dir: optional_buffer(
            world.last_move_dir.iter().map(|&v| v as i64),
            expected,
            world.last_move_dir.len(),
        ),
        lifetimes: optional_buffer(
            world.lifetimes.iter().map(|&v| v as i64),
            expected,
            world.lifetimes.len(),
        ),
    })
}

/// Encode a world straight to its JSON text form.
pub fn serialize_to_string(world: &World) -> Result<String, CodecError> {
    let snapshot = serialize(world)?;
    // Snapshot contains nothing serde_json cannot represent.
    Ok(serde_json::to_string(&snapshot).unwrap_or_default())
}

/// Decode a snapshot record into a fresh world. Data errors yield `None`.
pub fn deserialize(snapshot: &Snapshot) -> Option<World> {
    if snapshot.version != SNAPSHOT_VERSION {
        log::warn!(
            "unsupported snapshot version {}, expected {}",
            snapshot.version,
            SNAPSHOT_VERSION
        );
        return None;
    }
    if snapshot.width == 0 || snapshot.height == 0 {
        log::warn!(
            "snapshot has degenerate dimensions {}x{}",
            snapshot.width,
            snapshot.height
        );
        return None;
    }

    let mut world = World::new(snapshot.width, snapshot.height);
    decode_into(Some(&snapshot.cells), &mut world.cells, |v| v as u16);
    decode_into(snapshot.flags.as_ref(), &mut world.flags, |v| v as u8);
    decode_into(snapshot.last_move_dir.as_ref(), &mut world.last_move_dir, |v| v as i8);
    decode_into(snapshot.lifetimes.as_ref(), &mut world.lifetimes, |v| v as u16);
    Some(world)
}

/// Decode the JSON text form. Parse failures yield `None`, not an error.
pub fn deserialize_str(text: &str) -> Option<World> {
    let snapshot: Snapshot = match serde_json::from_str(text) {
        Ok(s) => s,
        Err(err) => {
            log::warn!("snapshot parse failed: {}", err);
            return None;
        }
    };
    deserialize(&snapshot)
}

/// RLE-encode unless that would not shrink the buffer, then store raw.
fn encode_buffer(values: impl Iterator<Item = i64> + Clone) -> Field {
    let raw_len = values.clone().count();
    let mut pairs: Vec<i64> = Vec::new();
    let mut current: Option<(i64, i64)> = None;

    for v in values.clone() {
        match current {
            Some((value, run)) if value == v && run < RUN_MAX => {
                current = Some((value, run + 1));
            }
            Some((value, run)) => {
                pairs.push(value);
                pairs.push(run);
                current = Some((v, 1));
            }
            None => current = Some((v, 1)),
        }
    }
    if let Some((value, run)) = current {
        pairs.push(value);
        pairs.push(run);
    }

    if pairs.len() >= raw_len {
        Field {
            encoding: Encoding::Raw,
            data: values.collect(),
        }
    } else {
        Field {
            encoding: Encoding::Rle,
            data: pairs,
        }
    }
}

fn optional_buffer(
    values: impl Iterator<Item = i64> + Clone,
    expected: usize,
    len: usize,
) -> Option<Field> {
    if len == expected {
        Some(encode_buffer(values))
    } else {
        None
    }
}

/// Decode a field into `dst`. A missing field, or one whose data runs short,
/// leaves the remainder zero-filled; excess source data is ignored.
fn decode_into<T: Copy + Default>(field: Option<&Field>, dst: &mut [T], from: impl Fn(i64) -> T) {
    dst.fill(T::default());
    let Some(field) = field else {
        return;
    };

    match field.encoding {
        Encoding::Raw => {
            for (slot, &v) in dst.iter_mut().zip(field.data.iter()) {
                *slot = from(v);
            }
        }
        Encoding::Rle => {
            let mut i = 0usize;
            for pair in field.data.chunks_exact(2) {
                let value = from(pair[0]);
                let run = pair[1].max(0) as usize;
                let end = i.saturating_add(run).min(dst.len());
                dst[i..end].fill(value);
                i = end;
                if i >= dst.len() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::materials::{MAT_SAND, MAT_WALL, MAT_WATER};

    #[test]
    fn uniform_world_round_trips_through_rle() {
        let mut world = World::new(32, 32);
        world.paint_circle(16, 16, 10, MAT_SAND);

        let snapshot = serialize(&world).unwrap();
        assert_eq!(snapshot.cells.encoding, Encoding::Rle);
        assert!(snapshot.cells.data.len() < world.cell_count());

        let restored = deserialize(&snapshot).expect("round trip");
        assert_eq!(restored.cells, world.cells);
        assert_eq!(restored.flags, world.flags);
        assert_eq!(restored.last_move_dir, world.last_move_dir);
        assert_eq!(restored.lifetimes, world.lifetimes);
    }

    #[test]
    fn high_entropy_world_falls_back_to_raw() {
        let mut world = World::new(16, 16);
        for (i, cell) in world.cells.iter_mut().enumerate() {
            // Alternating values defeat run-length encoding.
            *cell = if i % 2 == 0 { MAT_SAND } else { MAT_WATER };
        }

        let snapshot = serialize(&world).unwrap();
        assert_eq!(snapshot.cells.encoding, Encoding::Raw);
        assert_eq!(snapshot.cells.data.len(), world.cell_count());

        let restored = deserialize(&snapshot).expect("round trip");
        assert_eq!(restored.cells, world.cells);
    }

    #[test]
    fn json_text_round_trip() {
        let mut world = World::new(8, 8);
        world.paint_circle(4, 4, 2, MAT_WALL);
        world.set_lifetime(4, 4, 17);
        world.set_dir(4, 4, -1);

        let text = serialize_to_string(&world).unwrap();
        let restored = deserialize_str(&text).expect("parse back");
        assert_eq!(restored.cells, world.cells);
        assert_eq!(restored.lifetime_at(4, 4), 17);
        assert_eq!(restored.dir_at(4, 4), -1);
    }

    #[test]
    fn missing_version_is_treated_as_legacy_v1() {
        let text = r#"{"width": 2, "height": 2,
            "cells": {"encoding": "raw", "data": [1, 2, 3, 4]}}"#;
        let world = deserialize_str(text).expect("legacy snapshot");
        assert_eq!(world.cells, vec![1, 2, 3, 4]);
    }

    #[test]
    fn unknown_version_yields_none() {
        let text = r#"{"version": 99, "width": 2, "height": 2,
            "cells": {"encoding": "raw", "data": [0, 0, 0, 0]}}"#;
        assert!(deserialize_str(text).is_none());
    }

    #[test]
    fn garbage_text_yields_none() {
        assert!(deserialize_str("not json at all").is_none());
        assert!(deserialize_str("[1, 2, 3]").is_none());
    }

    #[test]
    fn zero_dimension_yields_none() {
        let text = r#"{"version": 1, "width": 0, "height": 4,
            "cells": {"encoding": "raw", "data": []}}"#;
        assert!(deserialize_str(text).is_none());
    }

    #[test]
    fn fractional_dimensions_truncate() {
        let text = r#"{"version": 1, "width": 3.9, "height": 2.1,
            "cells": {"encoding": "raw", "data": [5, 5, 5, 5, 5, 5]}}"#;
        let world = deserialize_str(text).expect("truncated dims");
        assert_eq!(world.width(), 3);
        assert_eq!(world.height(), 2);
        assert_eq!(world.cells, vec![5; 6]);
    }

    #[test]
    fn short_rle_zero_fills_the_tail() {
        let text = r#"{"version": 1, "width": 4, "height": 1,
            "cells": {"encoding": "rle", "data": [7, 2]}}"#;
        let world = deserialize_str(text).expect("short rle");
        assert_eq!(world.cells, vec![7, 7, 0, 0]);
    }

    #[test]
    fn overlong_rle_stops_at_destination_end() {
        let text = r#"{"version": 1, "width": 3, "height": 1,
            "cells": {"encoding": "rle", "data": [9, 1000]}}"#;
        let world = deserialize_str(text).expect("overlong rle");
        assert_eq!(world.cells, vec![9, 9, 9]);
    }

    #[test]
    fn non_numeric_data_coerces_to_zero() {
        let text = r#"{"version": 1, "width": 3, "height": 1,
            "cells": {"encoding": "raw", "data": [4, "oops", 6]}}"#;
        let world = deserialize_str(text).expect("lenient data");
        assert_eq!(world.cells, vec![4, 0, 6]);
    }

    #[test]
    fn missing_optional_buffers_decode_zero_filled() {
        let text = r#"{"version": 1, "width": 2, "height": 1,
            "cells": {"encoding": "raw", "data": [3, 3]}}"#;
        let world = deserialize_str(text).expect("no optional buffers");
        assert_eq!(world.flags, vec![0, 0]);
        assert_eq!(world.last_move_dir, vec![0, 0]);
        assert_eq!(world.lifetimes, vec![0, 0]);
    }

    #[test]
    fn serialized_size_never_exceeds_raw() {
        let mut world = World::new(16, 16);
        for (i, cell) in world.cells.iter_mut().enumerate() {
            *cell = (i % 3) as u16;
        }
        let snapshot = serialize(&world).unwrap();
        assert!(snapshot.cells.data.len() <= world.cell_count());
    }

    #[test]
    fn negative_dir_values_round_trip() {
        let mut world = World::new(4, 1);
        world.set_cell(0, 0, MAT_WATER);
        world.set_dir(0, 0, -1);
        world.set_dir(1, 0, 1);

        let snapshot = serialize(&world).unwrap();
        let restored = deserialize(&snapshot).expect("round trip");
        assert_eq!(restored.dir_at(0, 0), -1);
        assert_eq!(restored.dir_at(1, 0), 1);
    }
}
