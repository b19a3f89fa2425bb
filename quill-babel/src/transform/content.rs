//! Macro content stored outside the document.

use crate::ir::nodes::ContentSourceReference;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A [`ContentSourceReference`] could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ContentNotFoundError {
    #[error("no content source named '{0}'")]
    UnknownSource(String),

    #[error("'{reference}' not found in content source '{source_name}'")]
    Missing {
        source_name: String,
        reference: String,
    },

    #[error("content source '{source_name}' failed: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },
}

/// Resolves external macro content.
pub trait ContentSource: Send + Sync {
    fn resolve(&self, reference: &ContentSourceReference) -> Result<String, ContentNotFoundError>;
}

/// In-memory content source, keyed by source name then reference.
#[derive(Debug, Default, Clone)]
pub struct StaticContentSource {
    entries: HashMap<String, HashMap<String, String>>,
}

impl StaticContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        source: impl Into<String>,
        reference: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.entries
            .entry(source.into())
            .or_default()
            .insert(reference.into(), content.into());
    }

    pub fn with_entry(
        mut self,
        source: impl Into<String>,
        reference: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.insert(source, reference, content);
        self
    }
}

impl ContentSource for StaticContentSource {
    fn resolve(&self, reference: &ContentSourceReference) -> Result<String, ContentNotFoundError> {
        let entries = self
            .entries
            .get(&reference.source)
            .ok_or_else(|| ContentNotFoundError::UnknownSource(reference.source.clone()))?;
        entries
            .get(&reference.reference)
            .cloned()
            .ok_or_else(|| ContentNotFoundError::Missing {
                source_name: reference.source.clone(),
                reference: reference.reference.clone(),
            })
    }
}
