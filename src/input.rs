//! Where the log text comes from.

use anyhow::{Context, Result};
use bstr::ByteSlice;
use camino::Utf8PathBuf;
use std::fmt;
use std::io::{self, Read};

/// A log file, or stdin when no file (or `-`) is given.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum LogSource {
    Path(Utf8PathBuf),
    #[default]
    Stdin,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Path(path) => f.write_str(path.as_str()),
            LogSource::Stdin => f.write_str("<stdin>"),
        }
    }
}

impl From<Option<Utf8PathBuf>> for LogSource {
    fn from(arg: Option<Utf8PathBuf>) -> Self {
        match arg {
            Some(path) if path.as_str() != "-" => LogSource::Path(path),
            _ => LogSource::Stdin,
        }
    }
}

impl LogSource {
    /// Read the whole log into memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            LogSource::Path(path) => {
                std::fs::read(path).with_context(|| format!("failed to open file: {}", path))
            }
            LogSource::Stdin => {
                let mut buf = Vec::with_capacity(64 * 1024);
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .context("failed to read <stdin>")?;
                Ok(buf)
            }
        }
    }

    /// Read the whole log as text. Invalid UTF-8 sequences become U+FFFD.
    pub fn read_text(&self) -> Result<String> {
        Ok(match String::from_utf8(self.read_bytes()?) {
            Ok(text) => text,
            Err(err) => err.as_bytes().to_str_lossy().into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_or_nothing_means_stdin() {
        assert_eq!(LogSource::from(None), LogSource::Stdin);
        assert_eq!(LogSource::from(Some("-".into())), LogSource::Stdin);
        assert_eq!(
            LogSource::from(Some("access.log".into())),
            LogSource::Path("access.log".into())
        );
        assert_eq!(LogSource::Stdin.to_string(), "<stdin>");
    }

    #[test]
    fn missing_file_has_context() {
        let err = LogSource::Path("/nonexistent/access.log".into())
            .read_text()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/access.log"));
    }
}
