//! External byte representation for [`crate::Map`], behind the `serialize` feature.
//!
//! Format: a one-byte version tag, a big-endian `u32` entry count, a big-endian `f32` load
//! factor, then that many `(key, value)` pairs written back to back, each encoded with `bincode`
//! directly onto the stream (no extra length framing — `bincode`'s own encoding carries enough
//! structure for sequential decoding to find each value's end).

use std::collections::hash_map::RandomState;
use std::hash::Hash;
use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Map, MapError};

const FORMAT_VERSION: u8 = 1;

fn io_err(e: io::Error) -> MapError {
    MapError::Serialization(e.to_string())
}

fn bincode_err(e: bincode::Error) -> MapError {
    MapError::Serialization(e.to_string())
}

/// Encodes `map` into the external byte format.
pub fn to_bytes<K, V, S>(map: &Map<K, V, S>) -> Result<Vec<u8>, MapError>
where
    K: Serialize,
    V: Serialize,
{
    let mut out = Vec::new();
    out.write_u8(FORMAT_VERSION).map_err(io_err)?;
    out.write_u32::<BigEndian>(map.len() as u32).map_err(io_err)?;
    out.write_f32::<BigEndian>(map.load_factor() as f32).map_err(io_err)?;
    for (k, v) in map.iter() {
        bincode::serialize_into(&mut out, k).map_err(bincode_err)?;
        bincode::serialize_into(&mut out, v).map_err(bincode_err)?;
    }
    Ok(out)
}

/// Decodes a map previously written by [`to_bytes`].
pub fn from_bytes<K, V>(bytes: &[u8]) -> Result<Map<K, V, RandomState>, MapError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    let mut cursor = Cursor::new(bytes);
    let version = cursor.read_u8().map_err(io_err)?;
    if version != FORMAT_VERSION {
        return Err(MapError::Serialization(format!(
            "unsupported flathash format version {version}"
        )));
    }
    let size = cursor.read_u32::<BigEndian>().map_err(io_err)? as usize;
    let load_factor = f64::from(cursor.read_f32::<BigEndian>().map_err(io_err)?);
    let capacity = (((size as f64 / load_factor).ceil() as usize) + 1).max(8);
    let mut map = Map::try_with_capacity_and_load(capacity, load_factor)?;
    for _ in 0..size {
        let key: K = bincode::deserialize_from(&mut cursor).map_err(bincode_err)?;
        let value: V = bincode::deserialize_from(&mut cursor).map_err(bincode_err)?;
        map.put(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_map() {
        let mut map: Map<String, i32> = Map::new();
        map.put("a".to_string(), 1);
        map.put("b".to_string(), 2);
        map.put("c".to_string(), 3);

        let bytes = to_bytes(&map).unwrap();
        let restored: Map<String, i32> = from_bytes(&bytes).unwrap();

        assert_eq!(restored.len(), map.len());
        for (k, v) in map.iter() {
            assert_eq!(restored.get(k.as_str()), Some(v));
        }
    }

    #[test]
    fn rejects_unknown_format_version() {
        let mut bytes = to_bytes(&Map::<i32, i32>::new()).unwrap();
        bytes[0] = 0xFF;
        let result: Result<Map<i32, i32>, MapError> = from_bytes(&bytes);
        assert!(matches!(result, Err(MapError::Serialization(_))));
    }
}
