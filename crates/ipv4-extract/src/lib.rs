//! IPv4 token extraction and address classification for free-text logs.
//!
//! `ipv4-extract` finds dotted-quad shaped tokens in unstructured text and
//! classifies each one as public, private/reserved or malformed. Scanning and
//! validation are separate steps: the scanner accepts anything shaped like
//! four 1-3 digit groups (so `999.999.999.999` is a token), and the
//! [`classify`] step decides what the token really is.
//!
//! ## Quick Start
//!
//! ```
//! use ipv4_extract::{classify, Classification, ExtractorBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = ExtractorBuilder::new().build()?;
//! let input = "GET / from 8.8.8.8, then 10.0.0.5 and 999.1.1.1";
//!
//! let public: Vec<_> = extractor
//!     .tokens(input)
//!     .filter_map(|token| match classify(token) {
//!         Classification::Public(ip) => Some(ip),
//!         _ => None,
//!     })
//!     .collect();
//!
//! assert_eq!(public, vec!["8.8.8.8".parse::<std::net::Ipv4Addr>()?]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Word boundaries
//!
//! Tokens must sit on word boundaries, so `a1.2.3.4` and `1.2.3.45678` yield
//! nothing. By default boundaries are Unicode aware (a token glued to a
//! non-ASCII letter is not a token); [`ExtractorBuilder::unicode`] switches
//! to ASCII-only boundaries.

use std::ops::Range;

use regex_automata::meta::{FindMatches, Regex};
use regex_automata::util::syntax;

pub use regex_automata::meta::BuildError;

mod classify;
pub use classify::{classify, is_reserved, parse_ipv4_bytes, Classification};

/// Four 1-3 digit groups separated by literal dots, on word boundaries.
///
/// Octet ranges are not checked here; that is the classifier's job.
static IPV4_TOKEN_PATTERN: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";

/// Scanner for IPv4-shaped tokens.
///
/// An `Extractor` is cheap to clone and safe to share between threads. Build
/// it once with [`ExtractorBuilder`] and reuse it for every input.
#[derive(Clone, Debug)]
pub struct Extractor {
    regex: Regex,
}

impl Extractor {
    /// Find every IPv4-shaped token in `haystack`.
    ///
    /// Returns byte ranges `[start, end)` in first-occurrence order.
    /// Duplicates are kept. Ranges always fall on `char` boundaries.
    ///
    /// ```
    /// use ipv4_extract::ExtractorBuilder;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let extractor = ExtractorBuilder::new().build()?;
    /// let data = "from 1.1.1.1 to 1.1.1.1";
    /// let ranges: Vec<_> = extractor.find_iter(data).collect();
    /// assert_eq!(ranges, vec![5..12, 16..23]);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn find_iter<'a>(&'a self, haystack: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
        self.regex.find_iter(haystack).map(|m| m.range())
    }

    /// Like [`Extractor::find_iter`] but yields the matched substrings.
    ///
    /// The tokens borrow from `haystack` only, so they may outlive the
    /// extractor.
    #[inline]
    pub fn tokens<'r, 'h>(&'r self, haystack: &'h str) -> Tokens<'r, 'h> {
        Tokens {
            matches: self.regex.find_iter(haystack),
            haystack,
        }
    }
}

/// Iterator over IPv4-shaped substrings, created by [`Extractor::tokens`].
#[derive(Debug)]
pub struct Tokens<'r, 'h> {
    matches: FindMatches<'r, 'h>,
    haystack: &'h str,
}

impl<'r, 'h> Iterator for Tokens<'r, 'h> {
    type Item = &'h str;

    #[inline]
    fn next(&mut self) -> Option<&'h str> {
        let m = self.matches.next()?;
        Some(&self.haystack[m.range()])
    }
}

/// A builder for configuring token extraction.
///
/// # Example
///
/// ```
/// use ipv4_extract::ExtractorBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = ExtractorBuilder::new()
///     .unicode(false) // ASCII-only word boundaries
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ExtractorBuilder {
    unicode: bool,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorBuilder {
    /// Create a new builder. Unicode word boundaries are on by default.
    pub fn new() -> Self {
        Self { unicode: true }
    }

    /// Use Unicode (`true`) or ASCII-only (`false`) word boundaries.
    ///
    /// Default: `true`
    pub fn unicode(&mut self, yes: bool) -> &mut Self {
        self.unicode = yes;
        self
    }

    /// Compile the token pattern and return an `Extractor`.
    ///
    /// # Errors
    ///
    /// Returns the regex build error if the pattern cannot be compiled with
    /// the enabled `regex-automata` features.
    pub fn build(&self) -> Result<Extractor, BuildError> {
        let regex = Regex::builder()
            .syntax(syntax::Config::new().unicode(self.unicode))
            .configure(
                Regex::config()
                    .auto_prefilter(true)
                    .match_kind(regex_automata::MatchKind::LeftmostFirst),
            )
            .build(IPV4_TOKEN_PATTERN)?;
        Ok(Extractor { regex })
    }
}
