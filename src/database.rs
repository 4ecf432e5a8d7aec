use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use maxminddb::{geoip2, Mmap, Reader};
use tracing::debug;

use crate::error::{Error, Result};

/// Country fields returned by a database hit. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryRecord {
    /// ISO 3166-1 alpha-2 code, e.g. `US`.
    pub iso_code: Option<String>,
    /// Display name in the database's configured locale.
    pub name: Option<String>,
}

impl CountryRecord {
    pub fn new(iso_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            iso_code: Some(iso_code.into()),
            name: Some(name.into()),
        }
    }
}

/// Keyed, read-only country lookup service.
///
/// Implementations are opened once at startup and shared by every analysis,
/// possibly from several threads at once.
pub trait CountryDatabase: fmt::Debug + Send + Sync {
    /// Human readable description of the backing store.
    fn name(&self) -> &str;

    /// Look up the country for `ip`.
    ///
    /// Returns `Ok(None)` when the address is not in the database and an
    /// error when the record exists but could not be decoded.
    fn country(&self, ip: Ipv4Addr) -> Result<Option<CountryRecord>>;
}

/// Languages available for country names in GeoLite2/GeoIP2 databases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Japanese,
    German,
    Spanish,
    French,
    BrazilianPortuguese,
    Russian,
    SimplifiedChinese,
}

impl Locale {
    pub const ALL: [Locale; 8] = [
        Locale::English,
        Locale::Japanese,
        Locale::German,
        Locale::Spanish,
        Locale::French,
        Locale::BrazilianPortuguese,
        Locale::Russian,
        Locale::SimplifiedChinese,
    ];

    /// The MaxMind locale code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Japanese => "ja",
            Locale::German => "de",
            Locale::Spanish => "es",
            Locale::French => "fr",
            Locale::BrazilianPortuguese => "pt-BR",
            Locale::Russian => "ru",
            Locale::SimplifiedChinese => "zh-CN",
        }
    }

    fn pick<'a>(self, names: &geoip2::Names<'a>) -> Option<&'a str> {
        match self {
            Locale::English => names.english,
            Locale::Japanese => names.japanese,
            Locale::German => names.german,
            Locale::Spanish => names.spanish,
            Locale::French => names.french,
            Locale::BrazilianPortuguese => names.brazilian_portuguese,
            Locale::Russian => names.russian,
            Locale::SimplifiedChinese => names.simplified_chinese,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Locale::ALL.iter().map(|l| l.code()).collect();
                format!("unknown locale '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// MaxMind GeoLite2-Country / GeoIP2-Country database, memory mapped.
///
/// City databases work too since they are a superset of the country data.
pub struct MmdbCountryDatabase {
    path: Utf8PathBuf,
    reader: Reader<Mmap>,
    locale: Locale,
}

impl fmt::Debug for MmdbCountryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmdbCountryDatabase")
            .field("path", &self.path)
            .field("locale", &self.locale)
            .finish()
    }
}

impl MmdbCountryDatabase {
    /// Open and memory map the database at `path`.
    pub fn open(path: impl Into<Utf8PathBuf>, locale: Locale) -> Result<Self> {
        let path = path.into();
        // SAFETY: the file is mapped read-only and is not expected to be
        // modified while the process runs.
        let reader = unsafe { Reader::open_mmap(&path) }.map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        debug!(%path, "mapped country database");
        Ok(Self {
            path,
            reader,
            locale,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl CountryDatabase for MmdbCountryDatabase {
    fn name(&self) -> &str {
        self.path.as_str()
    }

    fn country(&self, ip: Ipv4Addr) -> Result<Option<CountryRecord>> {
        let lookup_failed = |source| Error::LookupFailed {
            ip: ip.to_string(),
            source,
        };

        let result = self.reader.lookup(IpAddr::V4(ip)).map_err(lookup_failed)?;
        let country = match result.decode::<geoip2::Country>().map_err(lookup_failed)? {
            Some(country) => country,
            None => return Ok(None),
        };

        Ok(Some(CountryRecord {
            iso_code: country.country.iso_code.map(str::to_owned),
            name: self.locale.pick(&country.country.names).map(str::to_owned),
        }))
    }
}
