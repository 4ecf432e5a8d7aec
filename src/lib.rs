//! The geoipsum library: country breakdowns of the public IPv4 addresses in
//! free-text logs.
//!
//! Text goes through four steps: IPv4-shaped tokens are extracted, private,
//! reserved and malformed tokens are dropped, each unique public address is
//! resolved once against an offline MaxMind country database, and the
//! occurrences are ranked per address and per country.
//!
//! # Examples
//!
//! Analyzing a log with an in-memory country database:
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use geoipsum::{Analyzer, CountryDatabase, CountryRecord, CountryResolver};
//!
//! #[derive(Debug)]
//! struct OnlyGoogle;
//!
//! impl CountryDatabase for OnlyGoogle {
//!     fn name(&self) -> &str {
//!         "only-google"
//!     }
//!
//!     fn country(&self, ip: Ipv4Addr) -> geoipsum::Result<Option<CountryRecord>> {
//!         Ok((ip == Ipv4Addr::new(8, 8, 8, 8)).then(|| CountryRecord::new("US", "United States")))
//!     }
//! }
//!
//! # fn main() -> geoipsum::Result<()> {
//! let analyzer = Analyzer::new(CountryResolver::new(OnlyGoogle))?;
//! let result = analyzer.analyze("8.8.8.8 requested twice 8.8.8.8 and 10.0.0.5 once")?;
//!
//! assert_eq!(result.summary.total_ips_found, 2);
//! assert_eq!(result.ip_list[0].country_code, "US");
//! # Ok(())
//! # }
//! ```
//!
//! Opening a real database follows the `-I`/`GEOIP_MMDB_DIR` convention:
//!
//! ```rust,no_run
//! use geoipsum::{Analyzer, CountryResolver, DatabaseConfig};
//!
//! let config = DatabaseConfig {
//!     directory: Some("/usr/share/GeoIP".into()),
//!     ..Default::default()
//! };
//! let analyzer = Analyzer::new(CountryResolver::open(&config)).unwrap();
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod database;
pub mod error;
pub mod input;
pub mod report;
pub mod resolver;

pub use crate::aggregate::{AddressRecord, CountrySummaryEntry};
pub use crate::analyzer::{count_lines, validate_input, AnalysisResult, Analyzer, Summary};
pub use crate::config::DatabaseConfig;
pub use crate::database::{CountryDatabase, CountryRecord, Locale, MmdbCountryDatabase};
pub use crate::error::{Error, Result};
pub use crate::resolver::{CountryInfo, CountryResolver, Resolution};
pub use ipv4_extract::{classify, Classification, Extractor, ExtractorBuilder};
