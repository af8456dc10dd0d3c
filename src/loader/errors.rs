//! Resource fetch and loader configuration errors
//!
//! Every per-resource failure mode is a [`FetchError`]. The loader never lets
//! one escape a cycle: it is logged and the resource degrades to `null`.

use std::fmt;
use std::fmt::Display;
use std::time::Duration;

/// Failure to obtain one resource document
#[derive(Debug)]
pub enum FetchError {
    /// The request never produced a response
    ///
    /// Occurs when:
    /// - The host is unreachable or refuses the connection
    /// - DNS resolution fails
    /// - The connection drops mid-body
    Transport(String),

    /// Reading a document from a local data directory failed
    Io(std::io::Error),

    /// The server answered with a non-success status
    Status(u16),

    /// The body is not a valid JSON document
    Parse(serde_json::Error),

    /// No answer within the per-request timeout
    Timeout(Duration),
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io(e) => Some(e),
            FetchError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(fmt, "transport error: {}", e),
            FetchError::Io(e) => write!(fmt, "read failed: {}", e),
            FetchError::Status(code) => write!(fmt, "HTTP {}", code),
            FetchError::Parse(e) => write!(fmt, "invalid JSON: {}", e),
            FetchError::Timeout(after) => write!(fmt, "timed out after {:?}", after),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e)
    }
}

/// Invalid resource/agent name configuration, rejected when a loader is built
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Name list contains no entries at all
    NoResources,

    /// Name is empty or contains characters other than ASCII alphanumerics, `-`, `_`
    InvalidName(String),

    /// Same name listed twice in one list
    Duplicate(String),

    /// A resource is named `agents`, which is where agent documents nest
    Reserved(String),

    /// Refresh interval or request timeout of zero
    ZeroDuration(&'static str),
}

impl std::error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::NoResources => "no resources configured".fmt(fmt),
            ConfigError::InvalidName(name) => write!(fmt, "invalid resource name {:?}", name),
            ConfigError::Duplicate(name) => write!(fmt, "duplicate resource name {:?}", name),
            ConfigError::Reserved(name) => write!(fmt, "resource name {:?} is reserved", name),
            ConfigError::ZeroDuration(field) => write!(fmt, "{} must be greater than zero", field),
        }
    }
}
