//! A tiny MaxMind DB writer for tests.
//!
//! The databases it produces are IPv4-only with a single search-tree node:
//! addresses in 0.0.0.0/1 resolve to the "low" record and addresses in
//! 128.0.0.0/1 to the "high" record. Either half may be left without data.
#![allow(dead_code)]

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use geoipdb::Value;

/// An address in the low half of the IPv4 space.
pub const LOW_IP: &str = "81.2.69.160";
/// An address in the high half of the IPv4 space.
pub const HIGH_IP: &str = "175.16.199.37";

const NODE_COUNT: u32 = 1;
const RECORD_SIZE: u16 = 24;
const DATA_SEPARATOR: [u8; 16] = [0; 16];
const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// Build a [`Value`] from JSON. Integers become `uint64`, floats `double`.
pub fn tree(v: serde_json::Value) -> Value {
    serde_json::from_value(v).unwrap()
}

#[derive(Debug, Clone)]
pub struct TestDb {
    database_type: String,
    languages: Vec<String>,
    description: Vec<(String, String)>,
    build_epoch: u64,
    low: Option<Value>,
    high: Option<Value>,
}

impl TestDb {
    pub fn new(database_type: &str) -> Self {
        Self {
            database_type: database_type.to_string(),
            languages: vec!["en".to_string(), "de".to_string()],
            description: vec![("en".to_string(), format!("{database_type} test data"))],
            build_epoch: 1_700_000_000,
            low: None,
            high: None,
        }
    }

    /// Serve `value` for 0.0.0.0/1.
    pub fn low(mut self, value: Value) -> Self {
        self.low = Some(value);
        self
    }

    /// Serve `value` for 128.0.0.0/1.
    pub fn high(mut self, value: Value) -> Self {
        self.high = Some(value);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        let mut record_for = |value: &Option<Value>| match value {
            // A record equal to the node count means "no data".
            None => NODE_COUNT,
            Some(v) => {
                let offset = data.len() as u32;
                encode(v, &mut data);
                NODE_COUNT + DATA_SEPARATOR.len() as u32 + offset
            }
        };
        let left = record_for(&self.low);
        let right = record_for(&self.high);

        let mut db = Vec::new();
        db.extend_from_slice(&left.to_be_bytes()[1..]);
        db.extend_from_slice(&right.to_be_bytes()[1..]);
        db.extend_from_slice(&DATA_SEPARATOR);
        db.extend_from_slice(&data);
        db.extend_from_slice(METADATA_MARKER);
        encode(&self.metadata(), &mut db);
        db
    }

    /// Write the database into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }

    fn metadata(&self) -> Value {
        let mut meta = geoipdb::value::Map::new();
        let mut put = |k: &str, v: Value| {
            meta.insert(k.to_string(), v);
        };
        put("binary_format_major_version", Value::Uint16(2));
        put("binary_format_minor_version", Value::Uint16(0));
        put("build_epoch", Value::Uint64(self.build_epoch));
        put("database_type", Value::from(self.database_type.as_str()));
        put(
            "description",
            Value::Map(
                self.description
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            ),
        );
        put("ip_version", Value::Uint16(4));
        put("languages", Value::from(self.languages.clone()));
        put("node_count", Value::Uint32(NODE_COUNT));
        put("record_size", Value::Uint16(RECORD_SIZE));
        Value::Map(meta)
    }
}

// MaxMind DB data section type numbers.
const POINTER: u8 = 1;
const STRING: u8 = 2;
const DOUBLE: u8 = 3;
const BYTES: u8 = 4;
const UINT16: u8 = 5;
const UINT32: u8 = 6;
const MAP: u8 = 7;
const INT32: u8 = 8;
const UINT64: u8 = 9;
const UINT128: u8 = 10;
const ARRAY: u8 = 11;
const BOOL: u8 = 14;
const FLOAT: u8 = 15;

/// Append the encoding of `value` to `out`.
pub fn encode(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Map(map) => {
            control(MAP, map.len(), out);
            for (key, v) in map {
                control(STRING, key.len(), out);
                out.extend_from_slice(key.as_bytes());
                encode(v, out);
            }
        }
        Value::Array(items) => {
            control(ARRAY, items.len(), out);
            for v in items {
                encode(v, out);
            }
        }
        Value::String(s) => {
            control(STRING, s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            control(BYTES, b.len(), out);
            out.extend_from_slice(b);
        }
        Value::Uint16(n) => unsigned(UINT16, &n.to_be_bytes(), out),
        Value::Uint32(n) => unsigned(UINT32, &n.to_be_bytes(), out),
        Value::Uint64(n) => unsigned(UINT64, &n.to_be_bytes(), out),
        Value::Uint128(n) => unsigned(UINT128, &n.to_be_bytes(), out),
        Value::Int32(n) => {
            control(INT32, 4, out);
            out.extend_from_slice(&n.to_be_bytes());
        }
        Value::Float(f) => {
            control(FLOAT, 4, out);
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::Double(d) => {
            control(DOUBLE, 8, out);
            out.extend_from_slice(&d.to_be_bytes());
        }
        Value::Bool(b) => control(BOOL, usize::from(*b), out),
        Value::Null => panic!("null has no MaxMind DB encoding"),
    }
}

// Unsigned integers are stored big-endian without leading zero bytes.
fn unsigned(type_num: u8, be: &[u8], out: &mut Vec<u8>) {
    let skip = be.iter().take_while(|b| **b == 0).count();
    let bytes = &be[skip..];
    control(type_num, bytes.len(), out);
    out.extend_from_slice(bytes);
}

fn control(type_num: u8, size: usize, out: &mut Vec<u8>) {
    debug_assert_ne!(type_num, POINTER, "pointers are never written");
    let (size_bits, extra): (u8, Vec<u8>) = if size < 29 {
        (size as u8, vec![])
    } else if size < 29 + 256 {
        (29, vec![(size - 29) as u8])
    } else if size < 29 + 256 + 65536 {
        (30, ((size - 285) as u16).to_be_bytes().to_vec())
    } else {
        (31, ((size - 65821) as u32).to_be_bytes()[1..].to_vec())
    };

    if type_num <= 7 {
        out.push(type_num << 5 | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&extra);
}

#[test]
fn control_bytes_match_the_format() {
    let mut out = Vec::new();
    encode(&Value::from("en"), &mut out);
    assert_eq!(out, [0x42, b'e', b'n']);

    out.clear();
    encode(&Value::Bool(true), &mut out);
    assert_eq!(out, [0x01, 0x07]);

    out.clear();
    encode(&Value::Uint32(14671), &mut out);
    assert_eq!(out, [0xC2, 0x39, 0x4F]);

    out.clear();
    encode(&Value::Array(vec![Value::Uint16(0)]), &mut out);
    assert_eq!(out, [0x01, 0x04, 0xA0]);
}
