//! Database edition classification.
//!
//! Every MaxMind DB declares a `database_type` string in its metadata. That
//! string decides which record shapes the database can answer: an Enterprise
//! database also answers City and Country lookups, Country databases answer
//! City lookups for backwards compatibility, and ISP databases answer ASN
//! lookups.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// One record shape a database edition can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AnonymousIp,
    Asn,
    City,
    ConnectionType,
    Country,
    Domain,
    Enterprise,
    Isp,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::AnonymousIp,
        Capability::Asn,
        Capability::City,
        Capability::ConnectionType,
        Capability::Country,
        Capability::Domain,
        Capability::Enterprise,
        Capability::Isp,
    ];

    /// Accessor name reported in [`Error::InvalidMethod`].
    pub fn method(self) -> &'static str {
        match self {
            Capability::AnonymousIp => "AnonymousIP",
            Capability::Asn => "ASN",
            Capability::City => "City",
            Capability::ConnectionType => "ConnectionType",
            Capability::Country => "Country",
            Capability::Domain => "Domain",
            Capability::Enterprise => "Enterprise",
            Capability::Isp => "ISP",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// The set of record shapes an opened database may answer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    /// The empty set.
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    /// Build a set from a list of capabilities.
    pub fn from_slice(caps: &[Capability]) -> Self {
        caps.iter().fold(Self::empty(), |set, cap| set.with(*cap))
    }

    /// Return a copy of this set with `cap` added.
    #[must_use]
    pub fn with(self, cap: Capability) -> Self {
        Capabilities(self.0 | cap.bit())
    }

    #[inline]
    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(*cap))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl Serialize for Capabilities {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

use Capability::*;

const ANONYMOUS_IP: &[Capability] = &[AnonymousIp];
const ASN: &[Capability] = &[Asn];
const CITY_COUNTRY: &[Capability] = &[City, Country];
const CONNECTION_TYPE: &[Capability] = &[ConnectionType];
const DOMAIN: &[Capability] = &[Domain];
const ENTERPRISE: &[Capability] = &[Enterprise, City, Country];
const ISP: &[Capability] = &[Isp, Asn];

/// Known `database_type` strings and what each may answer. Country editions
/// are grouped with City so City lookups keep working against them.
pub const EDITIONS: &[(&str, &[Capability])] = &[
    ("GeoIP2-Anonymous-IP", ANONYMOUS_IP),
    ("DBIP-ASN-Lite (compat=GeoLite2-ASN)", ASN),
    ("GeoLite2-ASN", ASN),
    ("DBIP-City-Lite", CITY_COUNTRY),
    ("DBIP-Country-Lite", CITY_COUNTRY),
    ("DBIP-Country", CITY_COUNTRY),
    ("DBIP-Location (compat=City)", CITY_COUNTRY),
    ("GeoLite2-City", CITY_COUNTRY),
    ("GeoIP-City-Redundant", CITY_COUNTRY),
    ("GeoIP2-City", CITY_COUNTRY),
    ("GeoIP2-City-Africa", CITY_COUNTRY),
    ("GeoIP2-City-Asia-Pacific", CITY_COUNTRY),
    ("GeoIP2-City-Europe", CITY_COUNTRY),
    ("GeoIP2-City-North-America", CITY_COUNTRY),
    ("GeoIP2-City-South-America", CITY_COUNTRY),
    ("GeoIP2-Precision-City", CITY_COUNTRY),
    ("GeoLite2-Country", CITY_COUNTRY),
    ("GeoIP2-Country", CITY_COUNTRY),
    ("GeoIP2-Connection-Type", CONNECTION_TYPE),
    ("GeoIP2-Domain", DOMAIN),
    ("DBIP-ISP (compat=Enterprise)", ENTERPRISE),
    ("DBIP-Location-ISP (compat=Enterprise)", ENTERPRISE),
    ("GeoIP2-Enterprise", ENTERPRISE),
    ("GeoIP2-ISP", ISP),
    ("GeoIP2-Precision-ISP", ISP),
];

/// Map a metadata `database_type` string to the record shapes it supports.
pub fn classify(database_type: &str) -> Result<Capabilities> {
    EDITIONS
        .iter()
        .find(|(name, _)| *name == database_type)
        .map(|(_, caps)| Capabilities::from_slice(caps))
        .ok_or_else(|| Error::UnknownDatabaseType {
            database_type: database_type.to_string(),
        })
}

// Most specific shape first.
const PRIMARY_ORDER: [Capability; 8] = [
    Enterprise,
    City,
    Country,
    Isp,
    Asn,
    AnonymousIp,
    ConnectionType,
    Domain,
];

/// A classified database edition: the declared type string together with the
/// capabilities derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edition {
    database_type: String,
    capabilities: Capabilities,
}

impl Edition {
    pub fn new(database_type: impl Into<String>) -> Result<Self> {
        let database_type = database_type.into();
        let capabilities = classify(&database_type)?;
        Ok(Self {
            database_type,
            capabilities,
        })
    }

    pub fn database_type(&self) -> &str {
        &self.database_type
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[inline]
    pub fn supports(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Fail with [`Error::InvalidMethod`] unless this edition supports `cap`.
    pub fn require(&self, cap: Capability) -> Result<()> {
        if self.supports(cap) {
            Ok(())
        } else {
            Err(Error::InvalidMethod {
                method: cap.method(),
                database_type: self.database_type.clone(),
            })
        }
    }

    /// The richest record shape this edition answers.
    pub fn primary_record(&self) -> Capability {
        PRIMARY_ORDER
            .into_iter()
            .find(|cap| self.supports(*cap))
            // classify never yields an empty set
            .unwrap_or(Domain)
    }
}
