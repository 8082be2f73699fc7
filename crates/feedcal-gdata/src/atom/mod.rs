//! Generic Atom document handling.
//!
//! Feed bodies are kept as a namespace-resolved element tree so that every
//! typed accessor in [`crate::entry`] reads and writes the document directly.
//! Elements are addressed by namespace URI + local name, attributes by their
//! local name.

mod element;
mod xml;

pub use element::{Attribute, Element, Node};
pub use xml::{parse, to_xml};

/// Atom syndication namespace.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Atom publishing protocol namespace.
pub const APP_NS: &str = "http://www.w3.org/2007/app";
/// Google data namespace (`gd:` elements).
pub const GD_NS: &str = "http://schemas.google.com/g/2005";
/// Google calendar namespace (`gCal:` elements).
pub const GCAL_NS: &str = "http://schemas.google.com/gCal/2005";
/// OpenSearch namespace used for paging metadata.
pub const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearchrss/1.0/";
/// The reserved `xml:` namespace; never declared.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefixes used when serializing well-known namespaces.
pub(crate) const KNOWN_PREFIXES: &[(&str, &str)] = &[
    (ATOM_NS, "atom"),
    (APP_NS, "app"),
    (GD_NS, "gd"),
    (GCAL_NS, "gCal"),
    (OPENSEARCH_NS, "openSearch"),
];

/// Content type for Atom request bodies.
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=UTF-8";
