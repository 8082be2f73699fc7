//! Calendar event entries.
//!
//! An [`Entry`] is a thin typed view over an `atom:entry` element tree.
//! Nothing is cached: every getter reads the tree and every setter writes
//! it, so the serialized document always matches what the accessors report.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use feedcal_core::time::{DATE_FORMAT, EventTime, format_entry_timestamp};

use crate::atom::{self, ATOM_NS, Element, GD_NS};
use crate::error::{FeedError, FeedResult};
use crate::fields::{Category, EVENT_VALUE_PREFIX, EventStatus, Person, Transparency, Visibility};
use crate::link::{self, Link, LinkRelation, REL_EDIT, REL_SELF};
use crate::recurrence::{self, Recurrence, RecurrenceCodec};
use crate::web_content::{self, WebContentLink};

/// Scheme of the category that marks an entry's kind.
pub const KIND_SCHEME: &str = "http://schemas.google.com/g/2005#kind";
/// Kind term for calendar events.
pub const EVENT_KIND: &str = "http://schemas.google.com/g/2005#event";
/// `rel` given to attendee elements.
pub const ATTENDEE_REL: &str = "http://schemas.google.com/g/2005#event.attendee";

/// A calendar event.
#[derive(Debug, Clone)]
pub struct Entry {
    root: Element,
    codec: Option<Arc<dyn RecurrenceCodec>>,
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl Entry {
    /// Creates an empty event entry.
    pub fn new() -> Self {
        Self::of_kind(EVENT_KIND)
    }

    /// Creates an empty entry whose kind category has the given term.
    pub(crate) fn of_kind(kind: &str) -> Self {
        let mut root = Element::new(ATOM_NS, "entry");
        root.push_child(category_element(&Category {
            scheme: Some(KIND_SCHEME.to_string()),
            term: kind.to_string(),
        }));
        Self {
            root,
            codec: recurrence::default_codec(),
        }
    }

    /// Wraps a parsed `atom:entry` element.
    pub fn from_element(root: Element) -> FeedResult<Self> {
        if !root.is(ATOM_NS, "entry") {
            return Err(FeedError::invalid_response(format!(
                "expected an Atom entry, found <{}>",
                root.name()
            )));
        }
        Ok(Self {
            root,
            codec: recurrence::default_codec(),
        })
    }

    /// Parses an entry document.
    pub fn parse(xml: &str) -> FeedResult<Self> {
        Self::from_element(atom::parse(xml)?)
    }

    /// Serializes the entry as a standalone document.
    pub fn to_xml(&self) -> FeedResult<String> {
        atom::to_xml(&self.root)
    }

    /// The underlying element tree.
    pub fn element(&self) -> &Element {
        &self.root
    }

    /// The underlying element tree, for fields without a typed accessor.
    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_element(self) -> Element {
        self.root
    }

    pub fn recurrence_codec(&self) -> Option<&Arc<dyn RecurrenceCodec>> {
        self.codec.as_ref()
    }

    /// Replaces the recurrence codec; `None` disables typed recurrence access.
    pub fn with_recurrence_codec(mut self, codec: Option<Arc<dyn RecurrenceCodec>>) -> Self {
        self.codec = codec;
        self
    }

    pub fn set_recurrence_codec(&mut self, codec: Option<Arc<dyn RecurrenceCodec>>) {
        self.codec = codec;
    }

    // Atom fields

    /// Service-assigned identifier; absent until the entry has been created.
    pub fn id(&self) -> Option<String> {
        self.root
            .child_text(ATOM_NS, "id")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    pub fn title(&self) -> Option<String> {
        self.root.child_text(ATOM_NS, "title")
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        set_text_construct(&mut self.root, "title", title.into());
    }

    pub fn content(&self) -> Option<String> {
        self.root.child_text(ATOM_NS, "content")
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        set_text_construct(&mut self.root, "content", content.into());
    }

    /// First author of the entry.
    pub fn author(&self) -> Option<Person> {
        self.root.child(ATOM_NS, "author").map(|author| Person {
            name: author.child_text(ATOM_NS, "name"),
            email: author.child_text(ATOM_NS, "email"),
        })
    }

    /// Replaces the author list with a single author.
    pub fn set_author(&mut self, person: &Person) {
        self.root.remove_children(ATOM_NS, "author");
        let mut author = Element::new(ATOM_NS, "author");
        if let Some(ref name) = person.name {
            author.set_child_text(ATOM_NS, "name", name.as_str());
        }
        if let Some(ref email) = person.email {
            author.set_child_text(ATOM_NS, "email", email.as_str());
        }
        self.root.push_child(author);
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.timestamp("published")
    }

    /// Last modification time as reported by the service.
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.timestamp("updated")
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.root.child_text(ATOM_NS, name)?;
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn categories(&self) -> Vec<Category> {
        self.root
            .children_named(ATOM_NS, "category")
            .filter_map(|c| {
                Some(Category {
                    scheme: c.attribute("scheme").map(str::to_string),
                    term: c.attribute("term")?.to_string(),
                })
            })
            .collect()
    }

    pub fn add_category(&mut self, category: &Category) {
        self.root.push_child(category_element(category));
    }

    // Time window

    /// Start and end of the first time window.
    ///
    /// Empty when no start is stored; a single element when only the start is.
    pub fn when(&self) -> Vec<EventTime> {
        let Some(when) = self.root.child(GD_NS, "when") else {
            return Vec::new();
        };
        let Some(start) = when.attribute("startTime").and_then(EventTime::parse_wire) else {
            return Vec::new();
        };
        let mut times = vec![start];
        if let Some(end) = when.attribute("endTime").and_then(EventTime::parse_wire) {
            times.push(end);
        }
        times
    }

    /// Sets the time window, converting both ends to UTC.
    ///
    /// All-day windows are stored as dates. Fails with `InvalidRange`
    /// unless `end` is strictly after `start`.
    pub fn set_when<Tz: TimeZone>(
        &mut self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        all_day: bool,
    ) -> FeedResult<()> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(FeedError::invalid_range(format!(
                "end {} is not after start {}",
                end, start
            )));
        }

        let render = |dt: DateTime<Utc>| {
            if all_day {
                dt.date_naive().format(DATE_FORMAT).to_string()
            } else {
                format_entry_timestamp(dt)
            }
        };
        self.root.edit_child(GD_NS, "when", |when| {
            when.set_attribute("startTime", render(start))
                .set_attribute("endTime", render(end));
        });
        Ok(())
    }

    // Enumerated fields

    pub fn status(&self) -> Option<EventStatus> {
        self.enum_value("eventStatus")
    }

    pub fn set_status(&mut self, status: EventStatus) {
        self.set_enum_value("eventStatus", status.as_str());
    }

    pub fn transparency(&self) -> Option<Transparency> {
        self.enum_value("transparency")
    }

    pub fn set_transparency(&mut self, transparency: Transparency) {
        self.set_enum_value("transparency", transparency.as_str());
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.enum_value("visibility")
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.set_enum_value("visibility", visibility.as_str());
    }

    fn enum_value<T: FromStr>(&self, name: &str) -> Option<T> {
        self.root
            .child_value(GD_NS, name)
            .and_then(|v| v.parse().ok())
    }

    fn set_enum_value(&mut self, name: &str, value: &str) {
        self.root.set_child_value(
            GD_NS,
            name,
            format!("{}{}", EVENT_VALUE_PREFIX, value.to_lowercase()),
        );
    }

    // Location and attendees

    pub fn location(&self) -> Option<String> {
        self.root
            .child(GD_NS, "where")
            .and_then(|w| w.attribute("valueString"))
            .map(str::to_string)
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.root.edit_child(GD_NS, "where", |place| {
            place.set_attribute("valueString", location);
        });
    }

    /// Everyone listed on the event.
    pub fn attendees(&self) -> Vec<Person> {
        self.root
            .children_named(GD_NS, "who")
            .map(|who| Person {
                name: who.attribute("valueString").map(str::to_string),
                email: who.attribute("email").map(str::to_string),
            })
            .collect()
    }

    /// Replaces the whole attendee list.
    pub fn set_attendees(&mut self, attendees: &[Person]) {
        self.root.remove_children(GD_NS, "who");
        for person in attendees {
            let mut who = Element::new(GD_NS, "who");
            who.set_attribute("rel", ATTENDEE_REL);
            if let Some(ref name) = person.name {
                who.set_attribute("valueString", name.as_str());
            }
            if let Some(ref email) = person.email {
                who.set_attribute("email", email.as_str());
            }
            self.root.push_child(who);
        }
    }

    // Links

    pub fn links(&self) -> Vec<Link> {
        link::links_of(&self.root)
    }

    /// First link with the given relation.
    pub fn link(&self, rel: &str) -> Option<Link> {
        self.links().into_iter().find(|l| l.rel == rel)
    }

    /// Address used to update or delete this entry.
    pub fn edit_url(&self) -> Option<String> {
        link::href_of(&self.root, REL_EDIT)
    }

    pub fn self_url(&self) -> Option<String> {
        link::href_of(&self.root, REL_SELF)
    }

    /// Appends a link, including any payload it carries.
    pub fn add_link(&mut self, link: &dyn LinkRelation) {
        self.root.push_child(link::link_element(link));
    }

    pub fn web_content_links(&self) -> Vec<WebContentLink> {
        web_content::web_content_links_of(&self.root)
    }

    // Recurrence

    /// The stored recurrence fragment, as-is.
    pub fn recurrence_text(&self) -> Option<String> {
        self.root
            .child_text(GD_NS, "recurrence")
            .filter(|text| !text.trim().is_empty())
    }

    pub fn set_recurrence_text(&mut self, fragment: impl Into<String>) {
        self.root.set_child_text(GD_NS, "recurrence", fragment);
    }

    /// Removes any recurrence, making this a single event again.
    pub fn clear_recurrence(&mut self) {
        self.root.remove_children(GD_NS, "recurrence");
    }

    /// Decodes the stored recurrence.
    ///
    /// Fails with `UnsupportedFeature` when the entry has no codec, whether
    /// or not a recurrence is stored.
    pub fn recurrence(&self) -> FeedResult<Option<Recurrence>> {
        let codec = self.require_codec()?;
        match self.recurrence_text() {
            Some(fragment) => codec
                .decode(&recurrence::wrap_envelope(&fragment))
                .map(Some),
            None => Ok(None),
        }
    }

    /// Encodes and stores a recurrence.
    pub fn set_recurrence(&mut self, value: &Recurrence) -> FeedResult<()> {
        let encoded = self.require_codec()?.encode(value)?;
        self.set_recurrence_text(recurrence::strip_envelope(&encoded));
        Ok(())
    }

    fn require_codec(&self) -> FeedResult<&Arc<dyn RecurrenceCodec>> {
        self.codec.as_ref().ok_or_else(|| {
            FeedError::unsupported("recurrence support requires a recurrence codec")
        })
    }
}

fn set_text_construct(root: &mut Element, name: &str, text: String) {
    root.edit_child(ATOM_NS, name, |construct| {
        construct.set_attribute("type", "text").set_text(text);
    });
}

fn category_element(category: &Category) -> Element {
    let mut element = Element::new(ATOM_NS, "category");
    if let Some(ref scheme) = category.scheme {
        element.set_attribute("scheme", scheme.as_str());
    }
    element.set_attribute("term", category.term.as_str());
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedErrorCode;
    use crate::link::REL_ALTERNATE;
    use crate::recurrence::RecurrenceTime;
    use crate::web_content::WebContent;
    use chrono::{Duration, FixedOffset, NaiveDate};

    const SERVER_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<entry xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005">
  <id>http://www.google.com/calendar/feeds/default/private/full/abc123</id>
  <published>2007-03-20T21:26:04.000Z</published>
  <updated>2007-03-20T21:28:46.000Z</updated>
  <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/g/2005#event"/>
  <title type="text">Tennis with Beth</title>
  <content type="text">Meet for a quick lesson.</content>
  <link rel="alternate" type="text/html" href="http://www.google.com/calendar/event?eid=abc"/>
  <link rel="self" type="application/atom+xml" href="http://www.google.com/calendar/feeds/default/private/full/abc123"/>
  <link rel="edit" type="application/atom+xml" href="http://www.google.com/calendar/feeds/default/private/full/abc123/63310109326"/>
  <author><name>Jo March</name><email>jo@gmail.com</email></author>
  <gd:eventStatus value="http://schemas.google.com/g/2005#event.confirmed"/>
  <gd:transparency value="http://schemas.google.com/g/2005#event.opaque"/>
  <gd:where valueString="Rolling Lawn Courts"/>
  <gd:who rel="http://schemas.google.com/g/2005#event.organizer" valueString="Jo March" email="jo@gmail.com"/>
  <gd:who rel="http://schemas.google.com/g/2005#event.attendee" email="beth@gmail.com"/>
  <gd:when startTime="2007-04-17T15:00:00.000Z" endTime="2007-04-17T17:00:00.000Z"/>
</entry>"#;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn reads_server_entry() {
        let entry = Entry::parse(SERVER_ENTRY).unwrap();
        assert_eq!(
            entry.id().as_deref(),
            Some("http://www.google.com/calendar/feeds/default/private/full/abc123")
        );
        assert_eq!(entry.title().as_deref(), Some("Tennis with Beth"));
        assert_eq!(entry.content().as_deref(), Some("Meet for a quick lesson."));
        assert_eq!(entry.author(), Some(Person::new("Jo March", "jo@gmail.com")));
        assert_eq!(entry.status(), Some(EventStatus::Confirmed));
        assert_eq!(entry.transparency(), Some(Transparency::Opaque));
        assert_eq!(entry.visibility(), None);
        assert_eq!(entry.location().as_deref(), Some("Rolling Lawn Courts"));
        assert_eq!(entry.published(), Some(utc(2007, 3, 20, 21, 26) + Duration::seconds(4)));
        assert_eq!(
            entry.edit_url().as_deref(),
            Some("http://www.google.com/calendar/feeds/default/private/full/abc123/63310109326")
        );
        assert_eq!(
            entry.self_url().as_deref(),
            Some("http://www.google.com/calendar/feeds/default/private/full/abc123")
        );
        assert!(entry.link(REL_ALTERNATE).is_some());
        assert_eq!(entry.categories()[0].term, EVENT_KIND);

        let when = entry.when();
        assert_eq!(
            when,
            vec![
                EventTime::from_utc(utc(2007, 4, 17, 15, 0)),
                EventTime::from_utc(utc(2007, 4, 17, 17, 0)),
            ]
        );
    }

    #[test]
    fn new_entry_is_an_event_without_id() {
        let entry = Entry::new();
        assert_eq!(entry.id(), None);
        assert_eq!(entry.edit_url(), None);
        assert!(entry.when().is_empty());
        assert_eq!(entry.categories().len(), 1);
        assert_eq!(entry.categories()[0].scheme.as_deref(), Some(KIND_SCHEME));
    }

    #[test]
    fn rejects_non_entry_documents() {
        let err = Entry::parse(r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::InvalidResponse);
    }

    #[test]
    fn setters_write_through() {
        let mut entry = Entry::new();
        entry.set_title("First");
        entry.set_title("Second");
        entry.set_content("Body");
        entry.set_location("Room 1");
        entry.set_author(&Person::new("Ada", "ada@example.com"));

        assert_eq!(entry.title().as_deref(), Some("Second"));
        assert_eq!(entry.element().children_named(ATOM_NS, "title").count(), 1);

        let reparsed = Entry::parse(&entry.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed.title().as_deref(), Some("Second"));
        assert_eq!(reparsed.content().as_deref(), Some("Body"));
        assert_eq!(reparsed.location().as_deref(), Some("Room 1"));
        assert_eq!(reparsed.author(), Some(Person::new("Ada", "ada@example.com")));
    }

    #[test]
    fn padded_text_survives_a_reparse() {
        let mut entry = Entry::new();
        entry.set_title(" padded ");
        entry.set_content("  indented body\n\n");
        entry.set_author(&Person::new(" Ada ", "ada@example.com"));

        let reparsed = Entry::parse(&entry.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed.title().as_deref(), Some(" padded "));
        assert_eq!(reparsed.content().as_deref(), Some("  indented body\n\n"));
        assert_eq!(reparsed.author(), Some(Person::new(" Ada ", "ada@example.com")));
        assert_eq!(reparsed.element(), entry.element());
    }

    #[test]
    fn indented_server_entry_has_no_stray_text() {
        let entry = Entry::parse(SERVER_ENTRY).unwrap();
        assert!(
            entry
                .element()
                .nodes()
                .iter()
                .all(|node| matches!(node, crate::atom::Node::Element(_)))
        );
    }

    mod when {
        use super::*;

        #[test]
        fn roundtrips_to_second_precision() {
            let mut entry = Entry::new();
            let start = utc(2025, 2, 5, 10, 30) + Duration::seconds(15);
            let end = start + Duration::hours(1);
            entry.set_when(start, end, false).unwrap();

            assert_eq!(
                entry.when(),
                vec![EventTime::from_utc(start), EventTime::from_utc(end)]
            );
            let when = entry.element().child(GD_NS, "when").unwrap();
            assert_eq!(when.attribute("startTime"), Some("2025-02-05T10:30:15.000Z"));
        }

        #[test]
        fn converts_offsets_to_utc() {
            let paris = FixedOffset::east_opt(3600).unwrap();
            let start = paris.with_ymd_and_hms(2025, 2, 5, 10, 0, 0).unwrap();
            let mut entry = Entry::new();
            entry.set_when(start, start + Duration::hours(2), false).unwrap();

            let when = entry.element().child(GD_NS, "when").unwrap();
            assert_eq!(when.attribute("startTime"), Some("2025-02-05T09:00:00.000Z"));
            assert_eq!(when.attribute("endTime"), Some("2025-02-05T11:00:00.000Z"));
        }

        #[test]
        fn all_day_truncates_to_dates() {
            let mut entry = Entry::new();
            entry
                .set_when(utc(2025, 2, 5, 10, 0), utc(2025, 2, 6, 10, 0), true)
                .unwrap();
            let date = |d| EventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, d).unwrap());
            assert_eq!(entry.when(), vec![date(5), date(6)]);
        }

        #[test]
        fn end_must_follow_start() {
            let mut entry = Entry::new();
            let t = utc(2025, 2, 5, 10, 0);
            let err = entry.set_when(t, t, false).unwrap_err();
            assert_eq!(err.code(), FeedErrorCode::InvalidRange);
            assert!(entry.set_when(t, t - Duration::minutes(1), false).is_err());
            assert!(entry.when().is_empty());
        }

        #[test]
        fn start_only_yields_one_element() {
            let mut entry = Entry::new();
            entry.element_mut().edit_child(GD_NS, "when", |when| {
                when.set_attribute("startTime", "2025-02-05");
            });
            assert_eq!(entry.when().len(), 1);
        }
    }

    #[test]
    fn enumerations_are_normalized() {
        let mut entry = Entry::new();
        entry.set_status("CONFIRMED".parse().unwrap());
        entry.set_visibility(Visibility::Private);
        entry.set_transparency(Transparency::Transparent);

        assert_eq!(entry.status(), Some(EventStatus::Confirmed));
        assert_eq!(entry.status().unwrap().as_str(), "confirmed");
        assert_eq!(
            entry.element().child_value(GD_NS, "eventStatus"),
            Some("http://schemas.google.com/g/2005#event.confirmed")
        );
        assert_eq!(entry.visibility(), Some(Visibility::Private));
        assert_eq!(entry.transparency(), Some(Transparency::Transparent));
    }

    #[test]
    fn attendees_are_replaced_wholesale() {
        let mut entry = Entry::parse(SERVER_ENTRY).unwrap();
        assert_eq!(
            entry.attendees(),
            vec![
                Person::new("Jo March", "jo@gmail.com"),
                Person::with_email("beth@gmail.com"),
            ]
        );

        entry.set_attendees(&[Person::with_name("Amy")]);
        assert_eq!(entry.attendees(), vec![Person::with_name("Amy")]);

        let who = entry.element().child(GD_NS, "who").unwrap();
        assert_eq!(who.attribute("rel"), Some(ATTENDEE_REL));

        entry.set_attendees(&[]);
        assert!(entry.attendees().is_empty());
    }

    #[test]
    fn web_content_links_roundtrip() {
        let mut entry = Entry::new();
        let link = WebContentLink::new(
            "World Cup",
            "http://www.google.com/calendar/images/google-holiday.gif",
            Some("image/gif"),
            WebContent::new("http://www.google.com/logos/worldcup06.gif").with_size(276, 120),
        )
        .unwrap();
        entry.add_link(&link);

        let reparsed = Entry::parse(&entry.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed.web_content_links(), vec![link]);
        assert_eq!(reparsed.links().len(), 1);
    }

    mod recurrence {
        use super::*;

        const FRAGMENT: &str = "DTSTART;VALUE=DATE:20070501\r\nDTEND;VALUE=DATE:20070502\r\nRRULE:FREQ=WEEKLY;BYDAY=Tu;UNTIL=20070904\r\n";

        #[test]
        fn raw_text_needs_no_codec() {
            let mut entry = Entry::new().with_recurrence_codec(None);
            entry.set_recurrence_text(FRAGMENT);
            assert_eq!(entry.recurrence_text().as_deref(), Some(FRAGMENT));
            entry.clear_recurrence();
            assert_eq!(entry.recurrence_text(), None);
        }

        #[test]
        fn missing_codec_is_unsupported() {
            let mut entry = Entry::new().with_recurrence_codec(None);
            assert_eq!(
                entry.recurrence().unwrap_err().code(),
                FeedErrorCode::UnsupportedFeature
            );
            let rec = Recurrence::default().with_rule("FREQ=DAILY");
            assert_eq!(
                entry.set_recurrence(&rec).unwrap_err().code(),
                FeedErrorCode::UnsupportedFeature
            );
        }

        #[derive(Debug)]
        struct FixedCodec;

        impl RecurrenceCodec for FixedCodec {
            fn decode(&self, text: &str) -> FeedResult<Recurrence> {
                assert!(text.starts_with("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\n"));
                assert!(text.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
                Ok(Recurrence::default().with_rule("FREQ=DAILY"))
            }

            fn encode(&self, _: &Recurrence) -> FeedResult<String> {
                Ok("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nRRULE:FREQ=DAILY\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n".to_string())
            }
        }

        #[test]
        fn injected_codec_sees_envelope() {
            let mut entry = Entry::new().with_recurrence_codec(Some(Arc::new(FixedCodec)));
            assert_eq!(entry.recurrence().unwrap(), None);

            entry
                .set_recurrence(&Recurrence::default().with_rule("FREQ=DAILY"))
                .unwrap();
            assert_eq!(entry.recurrence_text().as_deref(), Some("RRULE:FREQ=DAILY"));
            assert_eq!(
                entry.recurrence().unwrap().and_then(|r| r.rule).as_deref(),
                Some("FREQ=DAILY")
            );
        }

        #[cfg(feature = "recurrence")]
        #[test]
        fn default_codec_roundtrip() {
            let mut entry = Entry::new();
            entry.set_recurrence_text(FRAGMENT);
            let rec = entry.recurrence().unwrap().unwrap();
            assert_eq!(
                rec.start,
                Some(RecurrenceTime::Date(NaiveDate::from_ymd_opt(2007, 5, 1).unwrap()))
            );

            entry.set_recurrence(&rec).unwrap();
            let stored = entry.recurrence_text().unwrap();
            assert!(!stored.contains("BEGIN:VCALENDAR"));
            assert!(stored.contains("RRULE:FREQ=WEEKLY"));
            assert_eq!(entry.recurrence().unwrap().unwrap().start, rec.start);
        }

        #[cfg(feature = "recurrence")]
        #[test]
        fn saving_a_read_recurrence_keeps_exceptions() {
            let mut entry = Entry::new();
            entry.set_recurrence_text(
                "DTSTART;VALUE=DATE:20070501\nDURATION:P1D\nRRULE:FREQ=WEEKLY;BYDAY=Tu\nEXDATE;VALUE=DATE:20070515\n",
            );
            let rec = entry.recurrence().unwrap().unwrap();
            entry.set_recurrence(&rec).unwrap();

            let stored = entry.recurrence_text().unwrap();
            assert!(stored.contains("DURATION:P1D"));
            assert!(stored.contains("EXDATE;VALUE=DATE:20070515"));
            assert!(!stored.contains("DTEND"));
            assert_eq!(entry.recurrence().unwrap().unwrap(), rec);
        }
    }
}
