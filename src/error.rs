use std::net::IpAddr;

/// Boxed error produced by a lookup engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for the geoipdb library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database declares a type this library has no record shapes for.
    #[error("geoipdb: reader does not support the {database_type:?} database type")]
    UnknownDatabaseType { database_type: String },

    /// A record accessor was called that the opened database cannot answer.
    #[error("geoipdb: the {method} method does not support the {database_type} database")]
    InvalidMethod {
        method: &'static str,
        database_type: String,
    },

    /// The lookup engine failed while resolving an address.
    #[error("lookup failed for {ip}")]
    Lookup {
        ip: IpAddr,
        #[source]
        source: EngineError,
    },

    /// The lookup engine rejected the database. `origin` names the file, or
    /// `<bytes>` for in-memory buffers.
    #[error("failed to open database {origin}")]
    Open {
        origin: String,
        #[source]
        source: EngineError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
