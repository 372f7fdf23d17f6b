//! Error enum
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    Serde(serde_json::Error),
    Xml(quick_xml::Error),
    /// Missing or malformed translation index for a language pair.
    Index {
        pair: String,
        line: Option<u64>,
        reason: String,
    },
    MalformedFragment {
        path: PathBuf,
        reason: String,
    },
    /// Raised in strict identity mode, when link groups disagree on `fromDoc`/`toDoc`.
    IdentityMismatch {
        path: PathBuf,
        expected: (String, String),
        found: (String, String),
    },
    UnknownLang(String),
    Process {
        program: String,
        reason: String,
    },
    Timeout {
        program: String,
        secs: u64,
    },
    Custom(String),
}

impl Error {
    /// Filesystem errors abort a whole run, other ones are scoped to a language pair.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Glob(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Glob(e) => write!(f, "glob error: {}", e),
            Error::GlobPattern(e) => write!(f, "invalid glob pattern: {}", e),
            Error::Serde(e) => write!(f, "serialization error: {}", e),
            Error::Xml(e) => write!(f, "xml error: {}", e),
            Error::Index { pair, line, reason } => match line {
                Some(l) => write!(f, "[{}] bad index record at line {}: {}", pair, l, reason),
                None => write!(f, "[{}] bad index: {}", pair, reason),
            },
            Error::MalformedFragment { path, reason } => {
                write!(f, "malformed fragment {:?}: {}", path, reason)
            }
            Error::IdentityMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "document identity mismatch in {:?}: expected {}/{}, found {}/{}",
                path, expected.0, expected.1, found.0, found.1
            ),
            Error::UnknownLang(l) => write!(f, "invalid language code: {:?}", l),
            Error::Process { program, reason } => write!(f, "{} failed: {}", program, reason),
            Error::Timeout { program, secs } => {
                write!(f, "{} timed out after {}s", program, secs)
            }
            Error::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<quick_xml::Error> for Error {
    /// I/O failures stay I/O failures, so that a failed write remains fatal.
    fn from(e: quick_xml::Error) -> Error {
        match e {
            quick_xml::Error::Io(io) => Error::Io(
                Arc::try_unwrap(io).unwrap_or_else(|io| std::io::Error::new(io.kind(), io.to_string())),
            ),
            e => Error::Xml(e),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
