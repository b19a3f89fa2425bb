//! Syntax identifiers
//!
//!     Every dialect is addressed by a `type/version` identifier such as `plain/1.0` or
//!     `xdom+json/1.0`. Parsers and renderers are registered under these identifiers, raw blocks
//!     record the syntax their content is written in, and documents remember the syntax they
//!     were parsed from.

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `type/version` syntax identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Syntax {
    kind: String,
    version: String,
}

impl Syntax {
    pub fn new(kind: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            version: version.into(),
        }
    }

    /// The syntax family, e.g. `plain`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Debug listing of events, one per line.
    pub fn event_1_0() -> Self {
        Self::new("event", "1.0")
    }

    pub fn plain_1_0() -> Self {
        Self::new("plain", "1.0")
    }

    /// Lossless JSON interchange of the block tree.
    pub fn xdom_json_1_0() -> Self {
        Self::new("xdom+json", "1.0")
    }

    pub fn html_5_0() -> Self {
        Self::new("html", "5.0")
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.version)
    }
}

impl FromStr for Syntax {
    type Err = FormatError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id.split_once('/') {
            Some((kind, version)) if !kind.is_empty() && !version.is_empty() => {
                Ok(Syntax::new(kind, version))
            }
            _ => Err(FormatError::InvalidSyntax(id.to_string())),
        }
    }
}

impl TryFrom<String> for Syntax {
    type Error = FormatError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

impl From<Syntax> for String {
    fn from(syntax: Syntax) -> Self {
        syntax.to_string()
    }
}
