//! Typed resource references
//!
//!     Links and images address their target with a [`ResourceReference`]: a resource type tag
//!     (`doc`, `url`, `attach`, ...), an opaque reference string whose encoding depends on the
//!     type, and optional parameters. Whether the reference was written with an explicit
//!     `type:` prefix is remembered in `typed`, so that serializing it back produces the same
//!     shape the author wrote.
//!
//!     The type vocabulary is open: [`ResourceType`] is a string tag, and the set of types a
//!     dialect accepts is injected per call through a [`ReferenceContext`] predicate. Parsing
//!     and serialization of each type are pluggable, see [`parser`] and [`types`].

pub mod parser;
pub mod types;

use crate::parameters::Parameters;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub use parser::{ReferenceContext, ResourceReferenceParser, TypeParser, UntypedDetector};

/// Open string tag naming the kind of resource a reference points to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    pub const DOCUMENT: ResourceType = ResourceType::from_static("doc");
    pub const SPACE: ResourceType = ResourceType::from_static("space");
    pub const PAGE: ResourceType = ResourceType::from_static("page");
    pub const ATTACHMENT: ResourceType = ResourceType::from_static("attach");
    pub const PAGE_ATTACHMENT: ResourceType = ResourceType::from_static("pageAttach");
    pub const URL: ResourceType = ResourceType::from_static("url");
    pub const MAILTO: ResourceType = ResourceType::from_static("mailto");
    pub const PATH: ResourceType = ResourceType::from_static("path");
    pub const UNC: ResourceType = ResourceType::from_static("unc");
    pub const INTERWIKI: ResourceType = ResourceType::from_static("interwiki");
    pub const ICON: ResourceType = ResourceType::from_static("icon");
    pub const DATA: ResourceType = ResourceType::from_static("data");
    pub const USER: ResourceType = ResourceType::from_static("user");
    pub const UNKNOWN: ResourceType = ResourceType::from_static("unknown");

    pub const fn from_static(scheme: &'static str) -> Self {
        ResourceType(Cow::Borrowed(scheme))
    }

    pub fn new(scheme: impl Into<String>) -> Self {
        ResourceType(Cow::Owned(scheme.into()))
    }

    /// The prefix written before `:` in typed references.
    pub fn scheme(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(scheme: &str) -> Self {
        ResourceType::new(scheme)
    }
}

/// A typed, parameterized address of a link or image target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub reference: String,
    /// The reference was written with an explicit `type:` prefix.
    pub typed: bool,
    #[serde(default)]
    pub parameters: Parameters,
}

impl ResourceReference {
    pub fn new(resource_type: ResourceType, reference: impl Into<String>, typed: bool) -> Self {
        Self {
            resource_type,
            reference: reference.into(),
            typed,
            parameters: Parameters::new(),
        }
    }

    pub fn typed(resource_type: ResourceType, reference: impl Into<String>) -> Self {
        Self::new(resource_type, reference, true)
    }

    pub fn untyped(resource_type: ResourceType, reference: impl Into<String>) -> Self {
        Self::new(resource_type, reference, false)
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Typed = [{}] Type = [{}] Reference = [{}]",
            self.typed, self.resource_type, self.reference
        )?;
        if !self.parameters.is_empty() {
            f.write_str(" Parameters = [")?;
            for (index, (key, value)) in self.parameters.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "[{}] = [{}]", key, value)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
