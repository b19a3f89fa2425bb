//! Shared configuration loader for the Quill toolchain.
//!
//! `defaults/quill.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QuillConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use quill_babel::reference::{ReferenceContext, ResourceType};
use quill_babel::syntax::Syntax;
use quill_babel::transform::{PriorityScope, TransformConfig};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/quill.default.toml");

/// Top-level configuration consumed by Quill applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuillConfig {
    pub transform: TransformSettings,
    pub references: ReferenceSettings,
    pub render: RenderSettings,
}

/// Macro expansion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSettings {
    pub enabled: bool,
    pub max_passes: usize,
    pub priority_scope: PriorityScope,
}

impl TransformSettings {
    pub fn engine_config(&self) -> TransformConfig {
        TransformConfig {
            max_passes: self.max_passes,
            priority_scope: self.priority_scope,
        }
    }
}

/// Which resource types references may be parsed as.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSettings {
    pub default_type: ResourceType,
    pub permitted_types: Vec<ResourceType>,
}

impl ReferenceSettings {
    /// An empty `permitted_types` list permits everything.
    pub fn context(&self) -> ReferenceContext {
        let context = if self.permitted_types.is_empty() {
            ReferenceContext::allow_all()
        } else {
            ReferenceContext::permitting(self.permitted_types.iter().cloned())
        };
        context.with_default_type(self.default_type.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSettings {
    pub default_syntax: Syntax,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QuillConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuillConfig, ConfigError> {
    Loader::new().build()
}
