//! Typed lookups against GeoIP2 and GeoLite2 MaxMind DB files.
//!
//! A [`Reader`] classifies the database edition when it is opened and then
//! offers one accessor per record shape. Accessors the edition cannot answer
//! fail with [`Error::InvalidMethod`]; everything else returns a fully
//! populated record where absent data reads as zero values.
//!
//! # Examples
//!
//! ```rust,no_run
//! use geoipdb::Reader;
//!
//! let reader = Reader::open("/usr/share/GeoIP/GeoLite2-City.mmdb")?;
//! let city = reader.city("81.2.69.160".parse().unwrap())?;
//! println!("{} {}", city.country.iso_code, city.city.names.english);
//!
//! // An ASN lookup against a City database is a programming error.
//! assert!(reader.asn("81.2.69.160".parse().unwrap()).is_err());
//! # Ok::<(), geoipdb::Error>(())
//! ```

pub mod edition;
pub mod engine;
pub mod error;
pub mod input;
pub mod project;
pub mod reader;
pub mod records;
pub mod value;

pub use crate::edition::{classify, Capabilities, Capability, Edition};
pub use crate::engine::{LookupEngine, Metadata, MmdbEngine, StaticEngine};
pub use crate::error::{Error, Result};
pub use crate::project::{project, FromValue, Record};
pub use crate::reader::Reader;
pub use crate::records::{
    AnonymousIp, Asn, City, ConnectionType, Country, Domain, Enterprise, Isp, Names,
};
pub use crate::value::Value;
