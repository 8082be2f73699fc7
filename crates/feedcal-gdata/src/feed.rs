//! Atom feeds of events or calendars.

use std::sync::Arc;

use crate::atom::{self, ATOM_NS, Element, OPENSEARCH_NS};
use crate::entry::Entry;
use crate::error::{FeedError, FeedResult};
use crate::link::{self, REL_NEXT, REL_POST};
use crate::recurrence::RecurrenceCodec;

/// A page of entries returned by a list request.
#[derive(Debug, Clone)]
pub struct Feed {
    root: Element,
    entries: Vec<Entry>,
}

impl Feed {
    /// Parses a feed document; entries receive the given recurrence codec.
    pub fn parse(xml: &str, codec: Option<Arc<dyn RecurrenceCodec>>) -> FeedResult<Self> {
        let mut root = atom::parse(xml)?;
        if !root.is(ATOM_NS, "feed") {
            return Err(FeedError::invalid_response(format!(
                "expected an Atom feed, found <{}>",
                root.name()
            )));
        }

        let entries = root
            .children_named(ATOM_NS, "entry")
            .cloned()
            .map(|e| Entry::from_element(e).map(|e| e.with_recurrence_codec(codec.clone())))
            .collect::<FeedResult<Vec<_>>>()?;
        root.remove_children(ATOM_NS, "entry");

        Ok(Self { root, entries })
    }

    pub fn title(&self) -> Option<String> {
        self.root.child_text(ATOM_NS, "title")
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of matching entries across all pages.
    pub fn total_results(&self) -> Option<u32> {
        self.opensearch("totalResults")
    }

    /// 1-based index of the first entry on this page.
    pub fn start_index(&self) -> Option<u32> {
        self.opensearch("startIndex")
    }

    pub fn items_per_page(&self) -> Option<u32> {
        self.opensearch("itemsPerPage")
    }

    /// Address of the next page, if any.
    pub fn next_url(&self) -> Option<String> {
        link::href_of(&self.root, REL_NEXT)
    }

    /// Address new entries are posted to.
    pub fn post_url(&self) -> Option<String> {
        link::href_of(&self.root, REL_POST)
    }

    fn opensearch(&self, name: &str) -> Option<u32> {
        self.root
            .child_text(OPENSEARCH_NS, name)
            .and_then(|v| v.trim().parse().ok())
    }
}
