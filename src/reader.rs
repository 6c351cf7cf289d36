use std::net::IpAddr;
use std::path::Path;

use maxminddb::Mmap;

use crate::edition::{Capabilities, Edition};
use crate::engine::{LookupEngine, Metadata, MmdbEngine};
use crate::error::{Error, Result};
use crate::project::Record;
use crate::records::{AnonymousIp, Asn, City, ConnectionType, Country, Domain, Enterprise, Isp};
use crate::value::Value;

/// An open GeoIP2 or GeoLite2 database.
///
/// The edition is classified once when the reader is built. Each accessor
/// checks that the edition can answer it before touching the database, so
/// calling e.g. [`Reader::city`] on an ASN database fails with
/// [`Error::InvalidMethod`] instead of returning an empty record.
#[derive(Debug)]
pub struct Reader<E> {
    engine: E,
    edition: Edition,
}

impl Reader<MmdbEngine<Vec<u8>>> {
    /// Open the database file at `path`, reading it into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_engine(MmdbEngine::open(path)?)
    }
}

impl Reader<MmdbEngine<Mmap>> {
    /// Open the database file at `path` through a read-only memory map.
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_engine(MmdbEngine::open_mmap(path)?)
    }
}

impl<S: AsRef<[u8]>> Reader<MmdbEngine<S>> {
    /// Open a database already held in memory.
    pub fn open_from_bytes(buf: S) -> Result<Self> {
        Self::from_engine(MmdbEngine::from_bytes(buf)?)
    }
}

impl<E: LookupEngine> Reader<E> {
    /// Build a reader over any engine, classifying its declared database type.
    pub fn from_engine(engine: E) -> Result<Self> {
        let edition = Edition::new(engine.metadata().database_type.as_str())?;
        log::debug!(
            "opened {} database, capabilities {:?}",
            edition.database_type(),
            edition.capabilities()
        );
        Ok(Self { engine, edition })
    }

    /// Database metadata, as reported by the engine.
    pub fn metadata(&self) -> &Metadata {
        self.engine.metadata()
    }

    pub fn edition(&self) -> &Edition {
        &self.edition
    }

    pub fn capabilities(&self) -> Capabilities {
        self.edition.capabilities()
    }

    /// The raw lookup result for `ip`, without any shape check. An address
    /// with no record yields an empty map.
    pub fn lookup_value(&self, ip: IpAddr) -> Result<Value> {
        log::trace!("lookup {ip}");
        self.engine.lookup(ip).map_err(|source| Error::Lookup {
            ip,
            source: Box::new(source),
        })
    }

    /// Look up `ip` and project the result into any record shape.
    pub fn lookup<R: Record>(&self, ip: IpAddr) -> Result<R> {
        self.edition.require(R::CAPABILITY)?;
        let tree = self.lookup_value(ip)?;
        Ok(R::project(&tree))
    }

    /// City lookup. Works against City, Country and Enterprise databases.
    pub fn city(&self, ip: IpAddr) -> Result<City> {
        self.lookup(ip)
    }

    /// Country lookup. Works against City, Country and Enterprise databases.
    pub fn country(&self, ip: IpAddr) -> Result<Country> {
        self.lookup(ip)
    }

    pub fn enterprise(&self, ip: IpAddr) -> Result<Enterprise> {
        self.lookup(ip)
    }

    pub fn anonymous_ip(&self, ip: IpAddr) -> Result<AnonymousIp> {
        self.lookup(ip)
    }

    /// ASN lookup. Works against ASN and ISP databases.
    pub fn asn(&self, ip: IpAddr) -> Result<Asn> {
        self.lookup(ip)
    }

    pub fn connection_type(&self, ip: IpAddr) -> Result<ConnectionType> {
        self.lookup(ip)
    }

    pub fn domain(&self, ip: IpAddr) -> Result<Domain> {
        self.lookup(ip)
    }

    pub fn isp(&self, ip: IpAddr) -> Result<Isp> {
        self.lookup(ip)
    }

    /// Release the database. Dropping the reader does the same.
    pub fn close(self) {
        log::debug!("closing {} database", self.edition.database_type());
    }

    /// Take the engine back out of the reader.
    pub fn into_engine(self) -> E {
        self.engine
    }
}
