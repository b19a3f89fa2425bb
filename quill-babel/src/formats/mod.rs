//! Built-in syntax implementations
//!
//! This module contains the parsers and renderers shipped with Quill:
//!
//! - [`event`]: `event/1.0` renderer, one line per event
//! - [`plain`]: `plain/1.0` parser and renderer
//! - [`json`]: `xdom+json/1.0` parser and renderer, the lossless tree interchange

pub mod event;
pub mod json;
pub mod plain;

pub use event::EventRenderer;
pub use json::{JsonParser, JsonRenderer};
pub use plain::{PlainParser, PlainRenderer};
