use camino::{Utf8Path, Utf8PathBuf};

use crate::database::Locale;
use crate::error::{Error, Result};

/// File name of the free MaxMind country database.
pub const COUNTRY_DB_FILENAME: &str = "GeoLite2-Country.mmdb";

/// Directories searched, in order, when no path is configured.
pub const DEFAULT_MMDB_DIRS: &[&str] = &[
    ".",
    "/usr/share/GeoIP",
    "/opt/homebrew/var/GeoIP",
    "/var/lib/GeoIP",
];

/// Where to find the country database and how to read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Explicit database file. Takes precedence over `directory`.
    pub database: Option<Utf8PathBuf>,
    /// Directory containing `GeoLite2-Country.mmdb`.
    pub directory: Option<Utf8PathBuf>,
    /// Language for country display names.
    pub locale: Locale,
}

impl DatabaseConfig {
    /// Pick the database file to open.
    ///
    /// An explicit file or directory is returned as-is without checking that
    /// it exists, so the open error names the path the user gave. Otherwise
    /// the first default directory holding the database wins.
    pub fn locate(&self) -> Result<Utf8PathBuf> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        if let Some(dir) = &self.directory {
            return Ok(dir.join(COUNTRY_DB_FILENAME));
        }
        locate_in(DEFAULT_MMDB_DIRS.iter().map(Utf8Path::new))
    }
}

fn locate_in<'a>(dirs: impl IntoIterator<Item = &'a Utf8Path>) -> Result<Utf8PathBuf> {
    let mut searched = Vec::new();
    for dir in dirs {
        let candidate = dir.join(COUNTRY_DB_FILENAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate.into_string());
    }
    Err(Error::DatabaseNotFound {
        searched: searched.join(", "),
    })
}
