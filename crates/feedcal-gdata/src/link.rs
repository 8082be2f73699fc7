//! Atom link relations.

use serde::{Deserialize, Serialize};

use crate::atom::{ATOM_NS, Element};
use crate::web_content::WebContent;

/// Relation of the link used to update or delete an entry.
pub const REL_EDIT: &str = "edit";
/// Relation of the link identifying the entry itself.
pub const REL_SELF: &str = "self";
/// Relation of the human-readable page for an entry or feed.
pub const REL_ALTERNATE: &str = "alternate";
/// Relation of the next page of a feed.
pub const REL_NEXT: &str = "next";
/// Relation of the feed an entry or calendar publishes.
pub const REL_FEED: &str = "http://schemas.google.com/g/2005#feed";
/// Relation of the URL new entries are posted to.
pub const REL_POST: &str = "http://schemas.google.com/g/2005#post";

/// What a serializer needs to know to write an `atom:link`.
///
/// Plain links and links carrying a structured payload both implement this.
pub trait LinkRelation {
    /// Relation label.
    fn rel(&self) -> &str;

    /// Target address.
    fn href(&self) -> &str;

    /// MIME type of the target.
    fn link_type(&self) -> Option<&str>;

    /// Human-readable title.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Structured payload nested inside the link element.
    fn payload(&self) -> Option<&WebContent> {
        None
    }
}

/// A plain `atom:link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub link_type: Option<String>,
    pub title: Option<String>,
}

impl Link {
    /// Creates a link with no type or title.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            link_type: None,
            title: None,
        }
    }

    /// Sets the MIME type.
    pub fn with_type(mut self, link_type: impl Into<String>) -> Self {
        self.link_type = Some(link_type.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Reads an `atom:link` element. Links without `href` are skipped.
    ///
    /// A missing `rel` means `alternate`.
    pub fn from_element(element: &Element) -> Option<Self> {
        if !element.is(ATOM_NS, "link") {
            return None;
        }
        let href = element.attribute("href")?;
        Some(Self {
            rel: element
                .attribute("rel")
                .unwrap_or(REL_ALTERNATE)
                .to_string(),
            href: href.to_string(),
            link_type: element.attribute("type").map(str::to_string),
            title: element.attribute("title").map(str::to_string),
        })
    }
}

impl LinkRelation for Link {
    fn rel(&self) -> &str {
        &self.rel
    }

    fn href(&self) -> &str {
        &self.href
    }

    fn link_type(&self) -> Option<&str> {
        self.link_type.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Builds the `atom:link` element for any link relation.
pub(crate) fn link_element(link: &dyn LinkRelation) -> Element {
    let mut element = Element::new(ATOM_NS, "link");
    element.set_attribute("rel", link.rel());
    if let Some(title) = link.title() {
        element.set_attribute("title", title);
    }
    element.set_attribute("href", link.href());
    if let Some(link_type) = link.link_type() {
        element.set_attribute("type", link_type);
    }
    if let Some(payload) = link.payload() {
        element.push_child(payload.to_element());
    }
    element
}

/// Reads every link of an element, in document order.
pub(crate) fn links_of(element: &Element) -> Vec<Link> {
    element
        .children_named(ATOM_NS, "link")
        .filter_map(Link::from_element)
        .collect()
}

/// Returns the `href` of the first link with the given relation.
pub(crate) fn href_of(element: &Element, rel: &str) -> Option<String> {
    links_of(element)
        .into_iter()
        .find(|l| l.rel == rel)
        .map(|l| l.href)
}
