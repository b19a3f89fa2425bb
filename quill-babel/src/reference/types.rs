//! Built-in type parsers and untyped detectors.

use super::parser::{ResourceReferenceParser, TypeParser, UntypedDetector};
use super::{ResourceReference, ResourceType};
use once_cell::sync::Lazy;
use regex::Regex;

pub const QUERY_STRING: &str = "queryString";
pub const ANCHOR: &str = "anchor";
pub const INTERWIKI_ALIAS: &str = "interWikiAlias";

static URL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").unwrap());

/// Keeps the body opaque.
pub struct OpaqueType(pub ResourceType);

impl TypeParser for OpaqueType {
    fn resource_type(&self) -> ResourceType {
        self.0.clone()
    }
}

/// Document-like references (`doc`, `page`, `space`): `name?query#anchor`.
///
/// The anchor is split off at the first `#`, then the query at the first `?` of what remains.
pub struct EntityType(pub ResourceType);

impl TypeParser for EntityType {
    fn resource_type(&self) -> ResourceType {
        self.0.clone()
    }

    fn parse(&self, body: &str) -> ResourceReference {
        let (rest, anchor) = match body.split_once('#') {
            Some((rest, anchor)) => (rest, Some(anchor)),
            None => (body, None),
        };
        let (name, query) = match rest.split_once('?') {
            Some((name, query)) => (name, Some(query)),
            None => (rest, None),
        };

        let mut reference = ResourceReference::typed(self.0.clone(), name);
        if let Some(query) = query {
            reference = reference.with_parameter(QUERY_STRING, query);
        }
        if let Some(anchor) = anchor {
            reference = reference.with_parameter(ANCHOR, anchor);
        }
        reference
    }

    fn serialize(&self, reference: &ResourceReference) -> String {
        let mut body = reference.reference.clone();
        if let Some(query) = reference.parameter(QUERY_STRING) {
            body.push('?');
            body.push_str(query);
        }
        if let Some(anchor) = reference.parameter(ANCHOR) {
            body.push('#');
            body.push_str(anchor);
        }
        body
    }
}

/// `interwiki:alias:page`, the alias being optional.
pub struct InterWikiType;

impl TypeParser for InterWikiType {
    fn resource_type(&self) -> ResourceType {
        ResourceType::INTERWIKI
    }

    fn parse(&self, body: &str) -> ResourceReference {
        match body.split_once(':') {
            Some((alias, page)) => ResourceReference::typed(ResourceType::INTERWIKI, page)
                .with_parameter(INTERWIKI_ALIAS, alias),
            None => ResourceReference::typed(ResourceType::INTERWIKI, body),
        }
    }

    fn serialize(&self, reference: &ResourceReference) -> String {
        match reference.parameter(INTERWIKI_ALIAS) {
            Some(alias) => format!("{}:{}", alias, reference.reference),
            None => reference.reference.clone(),
        }
    }
}

/// Strings shaped like `scheme://rest` are URLs.
pub struct UrlDetector;

impl UntypedDetector for UrlDetector {
    fn resource_type(&self) -> ResourceType {
        ResourceType::URL
    }

    fn matches(&self, raw: &str) -> bool {
        URL_SHAPE.is_match(raw)
    }
}

pub(super) fn register_defaults(parser: &mut ResourceReferenceParser) {
    for entity in [ResourceType::DOCUMENT, ResourceType::PAGE, ResourceType::SPACE] {
        parser.register_type(EntityType(entity));
    }
    parser.register_type(InterWikiType);
    for opaque in [
        ResourceType::ATTACHMENT,
        ResourceType::PAGE_ATTACHMENT,
        ResourceType::URL,
        ResourceType::MAILTO,
        ResourceType::PATH,
        ResourceType::UNC,
        ResourceType::ICON,
        ResourceType::DATA,
        ResourceType::USER,
    ] {
        parser.register_type(OpaqueType(opaque));
    }
    parser.register_detector(UrlDetector);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_lifts_query_and_anchor() {
        let reference = EntityType(ResourceType::DOCUMENT).parse("Main.WebHome?x=1#top");
        assert_eq!(reference.reference, "Main.WebHome");
        assert_eq!(reference.parameter(QUERY_STRING), Some("x=1"));
        assert_eq!(reference.parameter(ANCHOR), Some("top"));
    }

    #[test]
    fn question_mark_after_anchor_stays_in_anchor() {
        let reference = EntityType(ResourceType::PAGE).parse("Home#a?b");
        assert_eq!(reference.reference, "Home");
        assert_eq!(reference.parameter(QUERY_STRING), None);
        assert_eq!(reference.parameter(ANCHOR), Some("a?b"));
    }

    #[test]
    fn entity_serializes_lifted_parts_back() {
        let parser = EntityType(ResourceType::DOCUMENT);
        let reference = parser.parse("Space.Page?#");
        assert_eq!(parser.serialize(&reference), "Space.Page?#");
    }

    #[test]
    fn interwiki_alias_is_optional() {
        let with_alias = InterWikiType.parse("wikipedia:Rust");
        assert_eq!(with_alias.reference, "Rust");
        assert_eq!(with_alias.parameter(INTERWIKI_ALIAS), Some("wikipedia"));
        assert_eq!(InterWikiType.serialize(&with_alias), "wikipedia:Rust");

        let bare = InterWikiType.parse("Rust");
        assert!(bare.parameters.is_empty());
        assert_eq!(InterWikiType.serialize(&bare), "Rust");
    }

    #[test]
    fn url_detector_requires_scheme_and_slashes() {
        assert!(UrlDetector.matches("https://example.org/a?b#c"));
        assert!(UrlDetector.matches("ftp://files.example.org"));
        assert!(!UrlDetector.matches("Main.WebHome"));
        assert!(!UrlDetector.matches("https://"));
        assert!(!UrlDetector.matches("https://has space"));
    }
}
