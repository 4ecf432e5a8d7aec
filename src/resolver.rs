//! Mapping public addresses to countries.

use std::fmt;
use std::net::Ipv4Addr;

use ipv4_extract::{classify, Classification};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::database::{CountryDatabase, CountryRecord, MmdbCountryDatabase};
use crate::error::{Error, Result};

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_CODE: &str = "N/A";

/// A country display name and its code (or a sentinel pair).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CountryInfo {
    pub name: String,
    pub code: String,
}

impl CountryInfo {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// `{"Unknown", "N/A"}`: no data for the address.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_NAME, UNKNOWN_CODE)
    }

    /// `{"InvalidIP", "IV"}`: the input was not a usable address.
    pub fn invalid() -> Self {
        Self::new("InvalidIP", "IV")
    }

    /// `{"PrivateIP", "PR"}`: the input was in a reserved range.
    pub fn private() -> Self {
        Self::new("PrivateIP", "PR")
    }

    fn from_record(record: CountryRecord) -> Self {
        let name = record
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let code = record
            .iso_code
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| UNKNOWN_CODE.to_string());
        Self { name, code }
    }
}

impl fmt::Display for CountryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Outcome of resolving one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The database knows the address.
    Resolved(CountryInfo),
    /// The database has no entry for the address.
    NotFound,
    /// The address could not be parsed, or its record could not be decoded.
    Invalid,
    /// The address is in a private or reserved range.
    Private,
    /// No database is loaded.
    Unavailable,
}

impl Resolution {
    /// The country payload, with sentinels for the non-resolved outcomes.
    pub fn country(&self) -> CountryInfo {
        match self {
            Resolution::Resolved(info) => info.clone(),
            Resolution::NotFound | Resolution::Unavailable => CountryInfo::unknown(),
            Resolution::Invalid => CountryInfo::invalid(),
            Resolution::Private => CountryInfo::private(),
        }
    }

    pub fn into_country(self) -> CountryInfo {
        match self {
            Resolution::Resolved(info) => info,
            other => other.country(),
        }
    }
}

/// Resolves public addresses to countries through a shared, read-only
/// [`CountryDatabase`].
///
/// A resolver whose database failed to load stays usable: direct lookups
/// degrade to `{"Unknown", "N/A"}` and [`CountryResolver::ensure_available`]
/// reports why.
#[derive(Debug)]
pub struct CountryResolver {
    database: Option<Box<dyn CountryDatabase>>,
    unavailable: Option<String>,
}

impl CountryResolver {
    /// Wrap an already opened database.
    pub fn new(database: impl CountryDatabase + 'static) -> Self {
        Self {
            database: Some(Box::new(database)),
            unavailable: None,
        }
    }

    /// A resolver with no database; `message` explains why.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            database: None,
            unavailable: Some(message.into()),
        }
    }

    /// Open the MMDB named by `config`.
    ///
    /// Failure to find or open the file is not an error here; it is logged
    /// and every later analysis fails with [`Error::ResolverUnavailable`].
    pub fn open(config: &DatabaseConfig) -> Self {
        let opened = config
            .locate()
            .and_then(|path| MmdbCountryDatabase::open(path, config.locale));
        match opened {
            Ok(database) => {
                info!(path = %database.path(), locale = %database.locale(), "opened country database");
                Self::new(database)
            }
            Err(err) => {
                warn!(error = %err, "country database unavailable");
                Self::unavailable(format!(
                    "GeoIP database could not be loaded: {}. Download GeoLite2-Country.mmdb from MaxMind.",
                    error_chain(&err)
                ))
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.database.is_some()
    }

    /// Fail with [`Error::ResolverUnavailable`] if no database is loaded.
    pub fn ensure_available(&self) -> Result<()> {
        if self.database.is_some() {
            return Ok(());
        }
        let message = self
            .unavailable
            .clone()
            .unwrap_or_else(|| "GeoIP database is not loaded".to_string());
        Err(Error::ResolverUnavailable { message })
    }

    /// Resolve a public address.
    pub fn resolve(&self, ip: Ipv4Addr) -> Resolution {
        let Some(database) = &self.database else {
            return Resolution::Unavailable;
        };
        match database.country(ip) {
            Ok(Some(record)) => Resolution::Resolved(CountryInfo::from_record(record)),
            Ok(None) => Resolution::NotFound,
            Err(err) => {
                debug!(%ip, error = %err, "country lookup failed");
                Resolution::Invalid
            }
        }
    }

    /// Resolve an unvalidated token, classifying it first.
    pub fn resolve_str(&self, token: &str) -> Resolution {
        if self.database.is_none() {
            return Resolution::Unavailable;
        }
        match classify(token) {
            Classification::Public(ip) => self.resolve(ip),
            Classification::Private(_) => Resolution::Private,
            Classification::Malformed => Resolution::Invalid,
        }
    }
}

fn error_chain(err: &Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
