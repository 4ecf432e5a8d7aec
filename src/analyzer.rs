use ipv4_extract::{classify, Extractor, ExtractorBuilder};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{self, AddressRecord, CountryMap, CountrySummaryEntry};
use crate::error::{Error, Result};
use crate::resolver::CountryResolver;

/// Headline counts for one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Lines in the raw input.
    pub total_lines: usize,
    /// Public address occurrences, duplicates included.
    pub total_ips_found: usize,
    /// Distinct public addresses.
    pub unique_ips_found: usize,
}

/// Everything `analyze` produces. Serializes to the JSON shape consumers
/// expect: `{summary, ip_list, country_summary}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub ip_list: Vec<AddressRecord>,
    pub country_summary: Vec<CountrySummaryEntry>,
}

impl AnalysisResult {
    /// Reject a result without any public address.
    pub fn ensure_found(self) -> Result<Self> {
        if self.summary.total_ips_found == 0 {
            return Err(Error::NoAddressesFound);
        }
        Ok(self)
    }
}

/// The extraction, filter, resolve and aggregate pipeline.
///
/// An `Analyzer` holds no per-call state and can be shared (for example
/// behind an `Arc`) by concurrent callers.
#[derive(Debug)]
pub struct Analyzer {
    extractor: Extractor,
    resolver: CountryResolver,
}

impl Analyzer {
    /// Build an analyzer with the default token extractor.
    pub fn new(resolver: CountryResolver) -> Result<Self> {
        let extractor = ExtractorBuilder::new().build()?;
        Ok(Self::with_extractor(extractor, resolver))
    }

    pub fn with_extractor(extractor: Extractor, resolver: CountryResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    pub fn resolver(&self) -> &CountryResolver {
        &self.resolver
    }

    /// Analyze `text` as one log.
    ///
    /// # Errors
    ///
    /// [`Error::ResolverUnavailable`] if the country database never loaded.
    /// Private, reserved and malformed tokens are dropped silently.
    pub fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        self.resolver.ensure_available()?;

        let total_lines = count_lines(text);
        let mut tokens = 0usize;
        let public = self
            .extractor
            .tokens(text)
            .inspect(|_| tokens += 1)
            .filter_map(|token| classify(token).public());
        let counts = aggregate::count_occurrences(public);

        let countries: CountryMap = counts
            .keys()
            .map(|&ip| (ip, self.resolver.resolve(ip).into_country()))
            .collect();

        let summary = Summary {
            total_lines,
            total_ips_found: counts.values().sum(),
            unique_ips_found: counts.len(),
        };
        debug!(
            total_lines,
            tokens,
            public = summary.total_ips_found,
            unique = summary.unique_ips_found,
            "analyzed input"
        );

        Ok(AnalysisResult {
            summary,
            ip_list: aggregate::ip_list(&counts, &countries),
            country_summary: aggregate::country_summary(&counts, &countries),
        })
    }
}

/// Reject empty or whitespace-only input before it reaches the pipeline.
pub fn validate_input(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(text)
}

/// Count lines the way `str.splitlines` does.
///
/// `\r\n` and each of `\n`, `\r`, `\x0b`, `\x0c`, `\x1c`, `\x1d`, `\x1e`,
/// U+0085, U+2028 and U+2029 end a line. A final line without a terminator
/// still counts; a trailing terminator does not open a new one.
pub fn count_lines(text: &str) -> usize {
    let bytes = text.as_bytes();
    // Every rare terminator contains one of these bytes: the ASCII controls
    // themselves, or the last byte of the UTF-8 form of U+0085/U+2028/U+2029.
    let rare = memchr::memchr3(0x0b, 0x0c, 0x1c, bytes).is_some()
        || memchr::memchr3(0x1d, 0x1e, 0x85, bytes).is_some()
        || memchr::memchr2(0xa8, 0xa9, bytes).is_some();
    if rare {
        count_lines_chars(text)
    } else {
        count_lines_newlines(bytes)
    }
}

fn count_lines_newlines(bytes: &[u8]) -> usize {
    let mut lines = 0;
    let mut start = 0;
    for pos in memchr::memchr2_iter(b'\n', b'\r', bytes) {
        // second half of a \r\n pair
        if pos < start {
            continue;
        }
        lines += 1;
        start = pos + 1;
        if bytes[pos] == b'\r' && bytes.get(start) == Some(&b'\n') {
            start += 1;
        }
    }
    if start < bytes.len() {
        lines += 1;
    }
    lines
}

fn count_lines_chars(text: &str) -> usize {
    let mut lines = 0;
    let mut open = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_line_break(c) {
            open = true;
            continue;
        }
        lines += 1;
        open = false;
        if c == '\r' && chars.peek() == Some(&'\n') {
            chars.next();
        }
    }
    if open {
        lines += 1;
    }
    lines
}

#[inline]
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
