//! Calendar resources: the entries of the calendar list feeds.

use crate::atom::{ATOM_NS, GCAL_NS};
use crate::entry::Entry;
use crate::error::FeedResult;

/// Kind term for calendar resources.
pub const CALENDAR_KIND: &str = "http://schemas.google.com/gCal/2005#calendarmeta";

const ALL_CALENDARS: &str = "/allcalendars/";
const OWN_CALENDARS: &str = "/owncalendars/";

/// A calendar resource.
///
/// Shares identity and links with [`Entry`] and adds calendar settings.
#[derive(Debug, Clone)]
pub struct CalendarEntry {
    entry: Entry,
}

impl Default for CalendarEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarEntry {
    /// Creates an empty calendar resource.
    pub fn new() -> Self {
        Self {
            entry: Entry::of_kind(CALENDAR_KIND).with_recurrence_codec(None),
        }
    }

    pub fn from_entry(entry: Entry) -> Self {
        Self { entry }
    }

    pub fn parse(xml: &str) -> FeedResult<Self> {
        Entry::parse(xml).map(Self::from_entry)
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut Entry {
        &mut self.entry
    }

    pub fn into_entry(self) -> Entry {
        self.entry
    }

    pub fn id(&self) -> Option<String> {
        self.entry.id()
    }

    pub fn title(&self) -> Option<String> {
        self.entry.title()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.entry.set_title(title);
    }

    pub fn summary(&self) -> Option<String> {
        self.entry.element().child_text(ATOM_NS, "summary")
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.entry
            .element_mut()
            .edit_child(ATOM_NS, "summary", |construct| {
                construct.set_attribute("type", "text").set_text(summary);
            });
    }

    /// Address used to update or delete the calendar.
    ///
    /// Entries read from the all-calendars list carry an edit link into
    /// that list; with `owned` set, the link is retargeted at the owned
    /// calendars list, which is where calendar settings are changed.
    pub fn edit_url(&self, owned: bool) -> Option<String> {
        let url = self.entry.edit_url()?;
        if owned {
            Some(url.replacen(ALL_CALENDARS, OWN_CALENDARS, 1))
        } else {
            Some(url)
        }
    }

    pub fn self_url(&self) -> Option<String> {
        self.entry.self_url()
    }

    /// The calendar identifier: the last path segment of the id, decoded.
    ///
    /// For a primary calendar this is the owner's email address.
    pub fn calendar_id(&self) -> Option<String> {
        let id = self.entry.id()?;
        let segment = id.trim_end_matches('/').rsplit('/').next()?;
        if segment.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        Some(decoded)
    }

    /// Display color, e.g. `#2952A3`.
    pub fn color(&self) -> Option<String> {
        self.gcal_value("color")
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.set_gcal_value("color", color.into());
    }

    pub fn hidden(&self) -> Option<bool> {
        self.gcal_value("hidden").map(|v| v == "true")
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.set_gcal_value("hidden", hidden.to_string());
    }

    /// Whether the calendar is shown in the user's calendar list.
    pub fn selected(&self) -> Option<bool> {
        self.gcal_value("selected").map(|v| v == "true")
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.set_gcal_value("selected", selected.to_string());
    }

    /// Olson timezone of the calendar.
    pub fn timezone(&self) -> Option<String> {
        self.gcal_value("timezone")
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.set_gcal_value("timezone", timezone.into());
    }

    /// The current user's access level (`owner`, `read`, ...). Read-only.
    pub fn access_level(&self) -> Option<String> {
        self.gcal_value("accesslevel")
    }

    fn gcal_value(&self, name: &str) -> Option<String> {
        self.entry
            .element()
            .child_value(GCAL_NS, name)
            .map(str::to_string)
    }

    fn set_gcal_value(&mut self, name: &str, value: String) {
        self.entry.element_mut().set_child_value(GCAL_NS, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALENDAR: &str = r##"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:gCal="http://schemas.google.com/gCal/2005">
  <id>http://www.google.com/calendar/feeds/default/allcalendars/full/jo%40gmail.com</id>
  <title type="text">Jo March</title>
  <summary type="text">Personal calendar</summary>
  <link rel="self" type="application/atom+xml" href="http://www.google.com/calendar/feeds/default/allcalendars/full/jo%40gmail.com"/>
  <link rel="edit" type="application/atom+xml" href="http://www.google.com/calendar/feeds/default/allcalendars/full/jo%40gmail.com"/>
  <gCal:accesslevel value="owner"/>
  <gCal:color value="#2952A3"/>
  <gCal:hidden value="false"/>
  <gCal:selected value="true"/>
  <gCal:timezone value="America/Los_Angeles"/>
</entry>"##;

    #[test]
    fn reads_calendar_settings() {
        let cal = CalendarEntry::parse(CALENDAR).unwrap();
        assert_eq!(cal.title().as_deref(), Some("Jo March"));
        assert_eq!(cal.summary().as_deref(), Some("Personal calendar"));
        assert_eq!(cal.calendar_id().as_deref(), Some("jo@gmail.com"));
        assert_eq!(cal.access_level().as_deref(), Some("owner"));
        assert_eq!(cal.color().as_deref(), Some("#2952A3"));
        assert_eq!(cal.hidden(), Some(false));
        assert_eq!(cal.selected(), Some(true));
        assert_eq!(cal.timezone().as_deref(), Some("America/Los_Angeles"));
    }

    #[test]
    fn edit_url_can_target_owned_calendars() {
        let cal = CalendarEntry::parse(CALENDAR).unwrap();
        assert_eq!(
            cal.edit_url(false).as_deref(),
            Some("http://www.google.com/calendar/feeds/default/allcalendars/full/jo%40gmail.com")
        );
        assert_eq!(
            cal.edit_url(true).as_deref(),
            Some("http://www.google.com/calendar/feeds/default/owncalendars/full/jo%40gmail.com")
        );
    }

    #[test]
    fn new_calendar_has_kind_and_settings() {
        let mut cal = CalendarEntry::new();
        cal.set_title("Little Women");
        cal.set_summary("Schedule");
        cal.set_color("#2952A3");
        cal.set_hidden(false);
        cal.set_timezone("Europe/Paris");

        let categories = cal.entry().categories();
        assert_eq!(categories[0].term, CALENDAR_KIND);
        assert_eq!(cal.summary().as_deref(), Some("Schedule"));
        assert_eq!(cal.hidden(), Some(false));
        assert_eq!(cal.id(), None);
        assert_eq!(cal.calendar_id(), None);
        assert_eq!(cal.edit_url(true), None);

        let xml = cal.entry().to_xml().unwrap();
        assert!(xml.contains(r#"<gCal:timezone value="Europe/Paris"/>"#));
    }
}
