//! Links that embed web content (gadgets, images, HTML) in an event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atom::{ATOM_NS, Element, GCAL_NS};
use crate::error::{FeedError, FeedResult};
use crate::link::{Link, LinkRelation};

/// Relation of web content links.
pub const WEB_CONTENT_REL: &str = "http://schemas.google.com/gCal/2005/webContent";

const GADGET_TYPE: &str = "application/x-google-gadgets+xml";

/// The structured payload of a web content link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebContent {
    /// Address of the content to display.
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Gadget preferences, by name.
    pub preferences: BTreeMap<String, String>,
}

impl WebContent {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the display size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Adds a gadget preference.
    pub fn with_preference(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.preferences.insert(name.into(), value.into());
        self
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = Element::new(GCAL_NS, "webContent");
        element.set_attribute("url", self.url.as_str());
        if let Some(width) = self.width {
            element.set_attribute("width", width.to_string());
        }
        if let Some(height) = self.height {
            element.set_attribute("height", height.to_string());
        }
        for (name, value) in &self.preferences {
            let mut pref = Element::new(GCAL_NS, "webContentGadgetPref");
            pref.set_attribute("name", name.as_str());
            pref.set_attribute("value", value.as_str());
            element.push_child(pref);
        }
        element
    }

    pub(crate) fn from_element(element: &Element) -> Option<Self> {
        let url = element.attribute("url")?.to_string();
        let preferences = element
            .children_named(GCAL_NS, "webContentGadgetPref")
            .filter_map(|p| Some((p.attribute("name")?.to_string(), p.attribute("value")?.to_string())))
            .collect();
        Some(Self {
            url,
            width: element.attribute("width").and_then(|w| w.parse().ok()),
            height: element.attribute("height").and_then(|h| h.parse().ok()),
            preferences,
        })
    }
}

/// A link relation carrying a [`WebContent`] payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebContentLink {
    link: Link,
    content: WebContent,
}

impl WebContentLink {
    /// Creates a web content link.
    ///
    /// `href` is the icon shown in the calendar grid. `link_type`, when
    /// given, must be `text/html`, `application/x-google-gadgets+xml` or an
    /// `image/*` type.
    pub fn new(
        title: impl Into<String>,
        href: impl Into<String>,
        link_type: Option<&str>,
        content: WebContent,
    ) -> FeedResult<Self> {
        let mut link = Link::new(WEB_CONTENT_REL, href).with_title(title);
        if let Some(link_type) = link_type {
            if !is_allowed_type(link_type) {
                return Err(FeedError::invalid_argument(format!(
                    "unsupported web content type: {}",
                    link_type
                )));
            }
            link = link.with_type(link_type);
        }
        Ok(Self { link, content })
    }

    /// Reads a web content link from an `atom:link` element.
    ///
    /// Returns `None` for other relations or when the payload is missing.
    pub fn from_element(element: &Element) -> Option<Self> {
        let link = Link::from_element(element)?;
        if link.rel != WEB_CONTENT_REL {
            return None;
        }
        let content = WebContent::from_element(element.child(GCAL_NS, "webContent")?)?;
        Some(Self { link, content })
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn content(&self) -> &WebContent {
        &self.content
    }
}

impl LinkRelation for WebContentLink {
    fn rel(&self) -> &str {
        &self.link.rel
    }

    fn href(&self) -> &str {
        &self.link.href
    }

    fn link_type(&self) -> Option<&str> {
        self.link.link_type.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.link.title.as_deref()
    }

    fn payload(&self) -> Option<&WebContent> {
        Some(&self.content)
    }
}

fn is_allowed_type(link_type: &str) -> bool {
    let t = link_type.trim().to_ascii_lowercase();
    t == "text/html"
        || t == GADGET_TYPE
        || t.strip_prefix("image/").is_some_and(|sub| !sub.is_empty())
}

/// Reads every web content link of an element.
pub(crate) fn web_content_links_of(element: &Element) -> Vec<WebContentLink> {
    element
        .children_named(ATOM_NS, "link")
        .filter_map(WebContentLink::from_element)
        .collect()
}
