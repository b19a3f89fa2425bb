//! Parsing and serializing resource references.
//!
//!     Parsing is a three-step fallback:
//!
//!     1. `<type>:<rest>` where `<type>` is registered and permitted by the context: the type's
//!        [`TypeParser`] produces a typed reference from `<rest>`.
//!     2. Each registered [`UntypedDetector`] is tried in registration order; detectors whose
//!        type the context does not permit are skipped.
//!     3. The raw string becomes an untyped reference of the context's default type.
//!
//!     Serialization is the inverse: typed references are written `<type>:<body>` through the
//!     registered type parser, everything else is written as the bare reference. For any
//!     reference produced by [`ResourceReferenceParser::parse`] under a context, parsing the
//!     serialized string under the same context yields the same reference.

use super::{types, ResourceReference, ResourceType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static TYPED_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([A-Za-z][A-Za-z0-9]*):(.*)$").unwrap());

/// Parser and serializer for the body of one typed reference (the part after `type:`).
pub trait TypeParser: Send + Sync {
    fn resource_type(&self) -> ResourceType;

    /// Builds a typed reference from the text after the `type:` prefix.
    fn parse(&self, body: &str) -> ResourceReference {
        ResourceReference::typed(self.resource_type(), body)
    }

    /// Writes the body back, folding lifted parameters into it.
    fn serialize(&self, reference: &ResourceReference) -> String {
        reference.reference.clone()
    }
}

/// Recognizes untyped references by their shape.
///
/// Detected references must keep the raw string as their reference so that writing them back
/// untouched parses to the same value.
pub trait UntypedDetector: Send + Sync {
    fn resource_type(&self) -> ResourceType;

    fn matches(&self, raw: &str) -> bool;
}

/// Per-dialect parsing context: which types are permitted, and the fallback type.
#[derive(Clone)]
pub struct ReferenceContext {
    permitted: Arc<dyn Fn(&ResourceType) -> bool + Send + Sync>,
    default_type: ResourceType,
}

impl ReferenceContext {
    pub fn new<F>(permitted: F) -> Self
    where
        F: Fn(&ResourceType) -> bool + Send + Sync + 'static,
    {
        Self {
            permitted: Arc::new(permitted),
            default_type: ResourceType::UNKNOWN,
        }
    }

    /// Every type is permitted.
    pub fn allow_all() -> Self {
        Self::new(|_| true)
    }

    /// Only the listed types are permitted.
    pub fn permitting(types: impl IntoIterator<Item = ResourceType>) -> Self {
        let types: Vec<ResourceType> = types.into_iter().collect();
        Self::new(move |candidate| types.contains(candidate))
    }

    pub fn with_default_type(mut self, default_type: ResourceType) -> Self {
        self.default_type = default_type;
        self
    }

    pub fn is_permitted(&self, resource_type: &ResourceType) -> bool {
        (self.permitted)(resource_type)
    }

    pub fn default_type(&self) -> &ResourceType {
        &self.default_type
    }
}

impl Default for ReferenceContext {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl fmt::Debug for ReferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceContext")
            .field("default_type", &self.default_type)
            .finish_non_exhaustive()
    }
}

/// Registry of type parsers and untyped detectors.
#[derive(Default)]
pub struct ResourceReferenceParser {
    types: HashMap<ResourceType, Box<dyn TypeParser>>,
    detectors: Vec<Box<dyn UntypedDetector>>,
}

impl ResourceReferenceParser {
    /// Creates an empty parser: every reference falls back to the context default type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser knowing every well-known type and the URL detector.
    pub fn with_defaults() -> Self {
        let mut parser = Self::new();
        types::register_defaults(&mut parser);
        parser
    }

    /// Registers a type parser, replacing any previous parser for the same type.
    pub fn register_type<P: TypeParser + 'static>(&mut self, type_parser: P) {
        self.types
            .insert(type_parser.resource_type(), Box::new(type_parser));
    }

    /// Appends an untyped detector; detectors run in registration order.
    pub fn register_detector<D: UntypedDetector + 'static>(&mut self, detector: D) {
        self.detectors.push(Box::new(detector));
    }

    pub fn has_type(&self, resource_type: &ResourceType) -> bool {
        self.types.contains_key(resource_type)
    }

    /// Registered types, sorted.
    pub fn list_types(&self) -> Vec<ResourceType> {
        let mut types: Vec<ResourceType> = self.types.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn parse(&self, raw: &str, context: &ReferenceContext) -> ResourceReference {
        if let Some(captures) = TYPED_REFERENCE.captures(raw) {
            let scheme = ResourceType::new(&captures[1]);
            if context.is_permitted(&scheme) {
                if let Some(type_parser) = self.types.get(&scheme) {
                    let body = captures.get(2).map_or("", |body| body.as_str());
                    return type_parser.parse(body);
                }
            }
        }

        for detector in &self.detectors {
            let detected = detector.resource_type();
            if context.is_permitted(&detected) && detector.matches(raw) {
                return ResourceReference::untyped(detected, raw);
            }
        }

        ResourceReference::untyped(context.default_type().clone(), raw)
    }

    /// A typed reference can carry its prefix only if its type has a registered parser.
    pub fn is_serializable(&self, reference: &ResourceReference) -> bool {
        reference.typed && self.has_type(&reference.resource_type)
    }

    pub fn serialize(&self, reference: &ResourceReference) -> String {
        match self.types.get(&reference.resource_type) {
            Some(type_parser) if reference.typed => {
                format!(
                    "{}:{}",
                    reference.resource_type.scheme(),
                    type_parser.serialize(reference)
                )
            }
            _ => reference.reference.clone(),
        }
    }
}

impl fmt::Debug for ResourceReferenceParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceReferenceParser")
            .field("types", &self.list_types())
            .field("detectors", &self.detectors.len())
            .finish()
    }
}
