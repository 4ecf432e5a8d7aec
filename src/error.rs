use camino::Utf8PathBuf;

/// Error types for the geoipsum library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The country database failed to load at startup, so no analysis can run.
    #[error("{message}")]
    ResolverUnavailable { message: String },

    /// The MMDB file exists but could not be opened or parsed.
    #[error("failed to open country database at {path}")]
    DatabaseOpen {
        path: Utf8PathBuf,
        #[source]
        source: maxminddb::MaxMindDbError,
    },

    /// No MMDB file was found at any candidate path.
    #[error("GeoIP country database not found (looked in: {searched})")]
    DatabaseNotFound { searched: String },

    /// The database returned an error while decoding a record.
    #[error("lookup failed for {ip}")]
    LookupFailed {
        ip: String,
        #[source]
        source: maxminddb::MaxMindDbError,
    },

    /// Input text was empty or only whitespace.
    #[error("Log text is empty")]
    EmptyInput,

    /// Input contained no public IPv4 addresses.
    #[error("No IP addresses found in the provided text.")]
    NoAddressesFound,

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A regex compilation error.
    #[error("regex error: {0}")]
    Regex(#[from] ipv4_extract::BuildError),
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
