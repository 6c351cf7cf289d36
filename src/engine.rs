//! The boundary between typed records and the raw database.
//!
//! A [`LookupEngine`] owns the binary search tree and data section. It hands
//! back the database [`Metadata`] and, for each address, a generic [`Value`]
//! tree. [`MmdbEngine`] implements it on top of the `maxminddb` crate; tests
//! and other backends can supply their own.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{MaxMindDBError, Mmap, Reader};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::Value;

/// Database metadata, passed through from the engine untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub binary_format_major_version: u16,
    pub binary_format_minor_version: u16,
    /// Seconds since the Unix epoch.
    pub build_epoch: u64,
    pub database_type: String,
    /// Language code to description.
    pub description: BTreeMap<String, String>,
    pub ip_version: u16,
    pub languages: Vec<String>,
    pub node_count: u32,
    pub record_size: u16,
}

impl From<&maxminddb::Metadata> for Metadata {
    fn from(meta: &maxminddb::Metadata) -> Self {
        Self {
            binary_format_major_version: meta.binary_format_major_version,
            binary_format_minor_version: meta.binary_format_minor_version,
            build_epoch: meta.build_epoch,
            database_type: meta.database_type.clone(),
            description: meta.description.clone(),
            ip_version: meta.ip_version,
            languages: meta.languages.clone(),
            node_count: meta.node_count,
            record_size: meta.record_size,
        }
    }
}

/// Source of metadata and raw lookup results.
pub trait LookupEngine {
    /// Error returned by [`LookupEngine::lookup`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Metadata of the open database.
    fn metadata(&self) -> &Metadata;

    /// Resolve `ip` to its data record. An address with no record yields an
    /// empty map rather than an error.
    fn lookup(&self, ip: IpAddr) -> std::result::Result<Value, Self::Error>;
}

/// A [`LookupEngine`] backed by a `maxminddb::Reader` over any byte source.
pub struct MmdbEngine<S: AsRef<[u8]>> {
    reader: Reader<S>,
    metadata: Metadata,
}

impl<S: AsRef<[u8]>> MmdbEngine<S> {
    /// Wrap an already opened reader.
    pub fn new(reader: Reader<S>) -> Self {
        let metadata = Metadata::from(&reader.metadata);
        Self { reader, metadata }
    }

    /// Parse a database held in memory.
    pub fn from_bytes(buf: S) -> Result<Self> {
        let reader = Reader::from_source(buf).map_err(|e| open_error("<bytes>", e))?;
        Ok(Self::new(reader))
    }
}

impl MmdbEngine<Vec<u8>> {
    /// Read a database file fully into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|e| open_error(path, e))?;
        Ok(Self::new(reader))
    }
}

impl MmdbEngine<Mmap> {
    /// Memory map a database file.
    ///
    /// The file must not be truncated or rewritten while it is mapped.
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        // Surface a missing or unreadable file as plain I/O.
        std::fs::metadata(path)?;
        let reader = Reader::open_mmap(path).map_err(|e| open_error(path, e))?;
        Ok(Self::new(reader))
    }
}

fn open_error(origin: impl AsRef<Path>, source: MaxMindDBError) -> Error {
    Error::Open {
        origin: origin.as_ref().display().to_string(),
        source: Box::new(source),
    }
}

impl<S: AsRef<[u8]>> LookupEngine for MmdbEngine<S> {
    type Error = MaxMindDBError;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn lookup(&self, ip: IpAddr) -> std::result::Result<Value, Self::Error> {
        match self.reader.lookup::<Value>(ip) {
            Ok(value) => Ok(value),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(Value::empty_map()),
            Err(e) => Err(e),
        }
    }
}

impl<S: AsRef<[u8]>> fmt::Debug for MmdbEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmdbEngine")
            .field("database_type", &self.metadata.database_type)
            .field("ip_version", &self.metadata.ip_version)
            .field("node_count", &self.metadata.node_count)
            .finish()
    }
}

/// An engine serving fixed records from memory, keyed by exact address.
///
/// Useful for tests and for wiring records that did not come from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticEngine {
    metadata: Metadata,
    records: BTreeMap<IpAddr, Value>,
}

impl StaticEngine {
    /// An engine reporting `database_type` with no records.
    pub fn new(database_type: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                binary_format_major_version: 2,
                database_type: database_type.into(),
                ip_version: 6,
                languages: vec!["en".to_string()],
                record_size: 28,
                ..Default::default()
            },
            records: BTreeMap::new(),
        }
    }

    /// Serve `value` for `ip`.
    #[must_use]
    pub fn with_record(mut self, ip: IpAddr, value: Value) -> Self {
        self.records.insert(ip, value);
        self
    }
}

impl LookupEngine for StaticEngine {
    type Error = std::convert::Infallible;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn lookup(&self, ip: IpAddr) -> std::result::Result<Value, Self::Error> {
        Ok(self.records.get(&ip).cloned().unwrap_or_else(Value::empty_map))
    }
}
