//! Account credentials.
//!
//! Tokens are read once from a flat file, one per line, and normalized into
//! `Authorization` header values.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

const SCHEME: &str = "Bearer ";
const PREVIEW_LEN: usize = 30;

/// A bearer token as sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trim `raw` and prefix the bearer scheme unless it is already there.
    pub fn new(raw: &str) -> Self {
        let token = raw.trim();
        if token.starts_with(SCHEME) {
            Self(token.to_string())
        } else {
            Self(format!("{SCHEME}{token}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 30 characters, for log lines.
    pub fn preview(&self) -> &str {
        match self.0.char_indices().nth(PREVIEW_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

// Keep full tokens out of debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}...)", self.preview())
    }
}

/// Parse file contents into credentials, skipping blank lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn parse_credentials(contents: &str) -> Vec<Credential> {
    contents
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Credential::new)
        .collect()
}

/// Load credentials from `path`.
///
/// Returns an empty vector when the file is missing, unreadable or has no
/// tokens. The reason is logged; the caller decides whether that is fatal.
pub fn load_credentials(path: &Path) -> Vec<Credential> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::error!(
                "{} not found. Please add your token manually.",
                path.display()
            );
            return Vec::new();
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let credentials = parse_credentials(&contents);
    if credentials.is_empty() {
        tracing::error!("{} is empty! Please update your token.", path.display());
    } else {
        tracing::info!("Loaded {} tokens.", credentials.len());
    }
    credentials
}
