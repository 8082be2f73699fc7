//! Recurrence rules embedded in entries.
//!
//! A recurring entry stores its repeat rules as an iCalendar fragment
//! (`DTSTART`, `DTEND`, `RRULE` content lines) inside `gd:recurrence`. The
//! fragment lacks the `BEGIN:`/`END:` lines an iCalendar decoder expects, so
//! reading wraps it in an envelope and writing strips the envelope again.
//!
//! Decoding and encoding go through a [`RecurrenceCodec`]. The default codec
//! is backed by the `icalendar` crate and only exists with the `recurrence`
//! feature; without it, recurrence access reports
//! [`FeedErrorCode::UnsupportedFeature`](crate::FeedErrorCode::UnsupportedFeature).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedResult;

/// Envelope lines placed before a fragment, outermost first.
pub const ENVELOPE_BEGIN: [&str; 2] = ["BEGIN:VCALENDAR", "BEGIN:VEVENT"];
/// Envelope lines placed after a fragment, innermost first.
pub const ENVELOPE_END: [&str; 2] = ["END:VEVENT", "END:VCALENDAR"];

/// A point in time as recurrence fragments express it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RecurrenceTime {
    /// `VALUE=DATE` form.
    Date(NaiveDate),
    /// A UTC instant (`...Z`).
    Utc(DateTime<Utc>),
    /// Local time with no zone.
    Floating(NaiveDateTime),
    /// Local time in a named zone (`TZID=...`).
    Zoned {
        /// Wall-clock time in `tzid`.
        date_time: NaiveDateTime,
        /// Olson zone identifier.
        tzid: String,
    },
}

/// Decoded recurrence: the series anchor, its repeat rule and whatever else
/// the fragment carried.
///
/// Lines the codec does not model are kept verbatim so that reading a
/// recurrence and writing it back leaves the fragment intact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recurrence {
    /// First occurrence start (`DTSTART`).
    pub start: Option<RecurrenceTime>,
    /// First occurrence end (`DTEND`).
    pub end: Option<RecurrenceTime>,
    /// Repeat rule body (`RRULE` value), e.g. `FREQ=WEEKLY;BYDAY=TU`.
    pub rule: Option<String>,
    /// Occurrence length (`DURATION` value), e.g. `PT3600S`.
    pub duration: Option<String>,
    /// Full `RDATE` content lines.
    pub rdates: Vec<String>,
    /// Full `EXDATE` content lines.
    pub exdates: Vec<String>,
    /// Any other content lines, nested components such as `VTIMEZONE` included.
    pub extra: Vec<String>,
}

impl Recurrence {
    /// Creates a recurrence anchored at `start`.
    pub fn new(start: RecurrenceTime) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    /// Sets the end of the first occurrence.
    pub fn with_end(mut self, end: RecurrenceTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the repeat rule.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Sets the occurrence length instead of an end.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Adds an `EXDATE` line, e.g. `EXDATE;VALUE=DATE:20070515`.
    pub fn with_exdate(mut self, line: impl Into<String>) -> Self {
        self.exdates.push(line.into());
        self
    }

    /// Content lines the anchor and rule leave out, in the order they are written.
    pub fn carried_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(ref duration) = self.duration {
            lines.push(format!("DURATION:{}", duration));
        }
        lines.extend(self.rdates.iter().cloned());
        lines.extend(self.exdates.iter().cloned());
        lines.extend(self.extra.iter().cloned());
        lines
    }
}

/// Converts between enveloped iCalendar text and [`Recurrence`] values.
pub trait RecurrenceCodec: fmt::Debug + Send + Sync {
    /// Decodes an enveloped fragment.
    fn decode(&self, text: &str) -> FeedResult<Recurrence>;

    /// Encodes a recurrence; the result may still carry envelope lines.
    fn encode(&self, recurrence: &Recurrence) -> FeedResult<String>;
}

/// Returns the codec entries use unless told otherwise.
pub fn default_codec() -> Option<Arc<dyn RecurrenceCodec>> {
    #[cfg(feature = "recurrence")]
    {
        Some(Arc::new(ics::IcsRecurrenceCodec))
    }
    #[cfg(not(feature = "recurrence"))]
    {
        None
    }
}

/// Wraps a stored fragment so a decoder accepts it.
///
/// Trailing blank lines are dropped first.
pub fn wrap_envelope(fragment: &str) -> String {
    let mut lines: Vec<&str> = fragment.lines().map(|l| l.trim_end_matches('\r')).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 4);
    out.extend(ENVELOPE_BEGIN);
    out.extend(lines);
    out.extend(ENVELOPE_END);
    let mut text = out.join("\r\n");
    text.push_str("\r\n");
    text
}

/// Removes the envelope from encoder output, leaving the bare fragment.
///
/// Nested components (such as `VTIMEZONE` blocks) are kept.
pub fn strip_envelope(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut begin = 0;
    while begin < lines.len() && is_envelope_line(lines[begin], &ENVELOPE_BEGIN) {
        begin += 1;
    }
    let mut end = lines.len();
    while end > begin && is_envelope_line(lines[end - 1], &ENVELOPE_END) {
        end -= 1;
    }

    lines[begin..end].join("\r\n")
}

fn is_envelope_line(line: &str, envelope: &[&str]) -> bool {
    envelope.iter().any(|e| line.trim().eq_ignore_ascii_case(e))
}

#[cfg(feature = "recurrence")]
pub use ics::IcsRecurrenceCodec;

#[cfg(feature = "recurrence")]
mod ics {
    use icalendar::{
        Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event,
        EventLike,
    };
    use tracing::trace;

    use super::{ENVELOPE_BEGIN, ENVELOPE_END, Recurrence, RecurrenceCodec, RecurrenceTime};
    use crate::error::{FeedError, FeedResult};

    /// Properties the iCalendar writer always emits that fragments never carry.
    const SYNTHESIZED: [&str; 5] = ["VERSION", "PRODID", "CALSCALE", "DTSTAMP", "UID"];

    /// Recurrence codec backed by the `icalendar` crate.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct IcsRecurrenceCodec;

    impl RecurrenceCodec for IcsRecurrenceCodec {
        fn decode(&self, text: &str) -> FeedResult<Recurrence> {
            let lines = sort_lines(text);
            let calendar: Calendar = envelope(&lines.modeled).parse().map_err(|e| {
                FeedError::invalid_response(format!("failed to parse recurrence: {}", e))
            })?;

            let event = calendar
                .iter()
                .find_map(|component| match component {
                    CalendarComponent::Event(event) => Some(event),
                    _ => None,
                })
                .ok_or_else(|| FeedError::invalid_response("recurrence has no event block"))?;

            Ok(Recurrence {
                start: event.get_start().map(from_ical),
                end: event.get_end().map(from_ical),
                rule: event.property_value("RRULE").map(str::to_string),
                duration: lines.duration,
                rdates: lines.rdates,
                exdates: lines.exdates,
                extra: lines.extra,
            })
        }

        fn encode(&self, recurrence: &Recurrence) -> FeedResult<String> {
            let mut event = Event::new();
            if let Some(ref start) = recurrence.start {
                event.starts(to_ical(start));
            }
            if let Some(ref end) = recurrence.end {
                event.ends(to_ical(end));
            }
            if let Some(ref rule) = recurrence.rule {
                event.add_property("RRULE", rule.as_str());
            }

            let mut calendar = Calendar::new();
            calendar.push(event.done());
            let text = calendar.to_string().replace("\r\n ", "");

            let mut lines: Vec<String> = text
                .lines()
                .filter(|line| !line.trim().is_empty() && !is_synthesized(line))
                .map(str::to_string)
                .collect();
            let carried = recurrence.carried_lines();
            let event_end = lines
                .iter()
                .rposition(|line| line.trim().eq_ignore_ascii_case("END:VEVENT"))
                .ok_or_else(|| FeedError::internal("encoded recurrence has no event block"))?;
            let tail = lines.split_off(event_end);
            lines.extend(carried);
            lines.extend(tail);
            trace!(lines = lines.len(), "Encoded recurrence");

            Ok(lines.join("\r\n"))
        }
    }

    /// A fragment split into what `icalendar` decodes and what is carried as-is.
    #[derive(Debug, Default)]
    struct SortedLines {
        modeled: Vec<String>,
        duration: Option<String>,
        rdates: Vec<String>,
        exdates: Vec<String>,
        extra: Vec<String>,
    }

    /// Sorts the event-level lines of an enveloped fragment.
    ///
    /// Folded lines are joined first. Everything inside a nested component
    /// goes to `extra` untouched.
    fn sort_lines(text: &str) -> SortedLines {
        let mut sorted = SortedLines::default();
        let mut depth = 0usize;

        for line in unfold(text) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let name = property_name(trimmed);
            let begins = name.eq_ignore_ascii_case("BEGIN");
            let ends = name.eq_ignore_ascii_case("END");

            let envelope_level = depth < ENVELOPE_BEGIN.len();
            if envelope_level && (begins || ends) {
                depth = if begins { depth + 1 } else { depth.saturating_sub(1) };
                continue;
            }
            if depth > ENVELOPE_BEGIN.len() || begins {
                if begins {
                    depth += 1;
                } else if ends {
                    depth -= 1;
                }
                sorted.extra.push(line);
                continue;
            }
            if ends {
                depth = depth.saturating_sub(1);
                continue;
            }

            match name.to_ascii_uppercase().as_str() {
                "DTSTART" | "DTEND" | "RRULE" => sorted.modeled.push(line),
                "DURATION" => {
                    sorted.duration = trimmed.split_once(':').map(|(_, v)| v.to_string());
                }
                "RDATE" => sorted.rdates.push(line),
                "EXDATE" => sorted.exdates.push(line),
                _ if is_synthesized(trimmed) => {}
                _ => sorted.extra.push(line),
            }
        }
        sorted
    }

    fn unfold(text: &str) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for raw in text.lines() {
            let raw = raw.trim_end_matches('\r');
            match (raw.strip_prefix([' ', '\t']), lines.last_mut()) {
                (Some(rest), Some(previous)) => previous.push_str(rest),
                _ => lines.push(raw.to_string()),
            }
        }
        lines
    }

    fn property_name(line: &str) -> &str {
        line.split([':', ';']).next().unwrap_or_default().trim()
    }

    fn envelope(lines: &[String]) -> String {
        let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 4);
        out.extend(ENVELOPE_BEGIN);
        out.extend(lines.iter().map(String::as_str));
        out.extend(ENVELOPE_END);
        let mut text = out.join("\r\n");
        text.push_str("\r\n");
        text
    }

    fn is_synthesized(line: &str) -> bool {
        let name = property_name(line);
        SYNTHESIZED.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    fn from_ical(value: DatePerhapsTime) -> RecurrenceTime {
        match value {
            DatePerhapsTime::Date(date) => RecurrenceTime::Date(date),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => RecurrenceTime::Utc(dt),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                RecurrenceTime::Floating(naive)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                RecurrenceTime::Zoned { date_time, tzid }
            }
        }
    }

    fn to_ical(value: &RecurrenceTime) -> DatePerhapsTime {
        match value {
            RecurrenceTime::Date(date) => DatePerhapsTime::Date(*date),
            RecurrenceTime::Utc(dt) => DatePerhapsTime::DateTime(CalendarDateTime::Utc(*dt)),
            RecurrenceTime::Floating(naive) => {
                DatePerhapsTime::DateTime(CalendarDateTime::Floating(*naive))
            }
            RecurrenceTime::Zoned { date_time, tzid } => {
                DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
                    date_time: *date_time,
                    tzid: tzid.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = "DTSTART;VALUE=DATE:20070501\r\nDTEND;VALUE=DATE:20070502\r\nRRULE:FREQ=WEEKLY;BYDAY=Tu;UNTIL=20070904\r\n\r\n\r\n";

    #[test]
    fn wrap_drops_trailing_blank_lines() {
        let wrapped = wrap_envelope(FRAGMENT);
        assert!(wrapped.starts_with("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART"));
        assert!(wrapped.ends_with("UNTIL=20070904\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn strip_is_inverse_of_wrap() {
        let stripped = strip_envelope(&wrap_envelope(FRAGMENT));
        assert_eq!(
            stripped,
            "DTSTART;VALUE=DATE:20070501\r\nDTEND;VALUE=DATE:20070502\r\nRRULE:FREQ=WEEKLY;BYDAY=Tu;UNTIL=20070904"
        );
    }

    #[test]
    fn strip_keeps_nested_components() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nRRULE:FREQ=DAILY\nBEGIN:VTIMEZONE\nTZID:Europe/Paris\nEND:VTIMEZONE\nEND:VEVENT\nEND:VCALENDAR\n";
        assert_eq!(
            strip_envelope(text),
            "RRULE:FREQ=DAILY\r\nBEGIN:VTIMEZONE\r\nTZID:Europe/Paris\r\nEND:VTIMEZONE"
        );
    }

    #[test]
    fn builder() {
        let start = RecurrenceTime::Date(NaiveDate::from_ymd_opt(2007, 5, 1).unwrap());
        let rec = Recurrence::new(start.clone()).with_rule("FREQ=DAILY");
        assert_eq!(rec.start, Some(start));
        assert_eq!(rec.end, None);
        assert_eq!(rec.rule.as_deref(), Some("FREQ=DAILY"));
    }

    #[test]
    fn carried_lines_order() {
        let rec = Recurrence::default()
            .with_duration("PT3600S")
            .with_exdate("EXDATE;VALUE=DATE:20070515");
        assert_eq!(
            rec.carried_lines(),
            vec!["DURATION:PT3600S", "EXDATE;VALUE=DATE:20070515"]
        );
    }

    #[cfg(feature = "recurrence")]
    mod ics_codec {
        use super::*;

        #[test]
        fn decodes_dates_and_rule() {
            let rec = IcsRecurrenceCodec.decode(&wrap_envelope(FRAGMENT)).unwrap();
            assert_eq!(
                rec.start,
                Some(RecurrenceTime::Date(NaiveDate::from_ymd_opt(2007, 5, 1).unwrap()))
            );
            assert_eq!(
                rec.end,
                Some(RecurrenceTime::Date(NaiveDate::from_ymd_opt(2007, 5, 2).unwrap()))
            );
            assert_eq!(rec.rule.as_deref(), Some("FREQ=WEEKLY;BYDAY=Tu;UNTIL=20070904"));
        }

        const ZONED: &str = "DTSTART;TZID=America/Los_Angeles:20070501T090000\r
DURATION:PT3600S\r
RRULE:FREQ=WEEKLY;BYDAY=Tu;UNTIL=20070904T160000Z\r
EXDATE;TZID=America/Los_Angeles:20070515T090000\r
BEGIN:VTIMEZONE\r
TZID:America/Los_Angeles\r
X-LIC-LOCATION:America/Los_Angeles\r
BEGIN:STANDARD\r
TZOFFSETFROM:-0700\r
TZOFFSETTO:-0800\r
TZNAME:PST\r
DTSTART:19701025T020000\r
END:STANDARD\r
END:VTIMEZONE";

        #[test]
        fn decodes_lines_it_does_not_model() {
            let rec = IcsRecurrenceCodec.decode(&wrap_envelope(ZONED)).unwrap();
            assert_eq!(
                rec.start,
                Some(RecurrenceTime::Zoned {
                    date_time: NaiveDate::from_ymd_opt(2007, 5, 1)
                        .unwrap()
                        .and_hms_opt(9, 0, 0)
                        .unwrap(),
                    tzid: "America/Los_Angeles".to_string(),
                })
            );
            assert_eq!(rec.end, None);
            assert_eq!(rec.duration.as_deref(), Some("PT3600S"));
            assert_eq!(
                rec.exdates,
                vec!["EXDATE;TZID=America/Los_Angeles:20070515T090000"]
            );
            assert!(rec.rdates.is_empty());
            assert_eq!(rec.extra.first().map(String::as_str), Some("BEGIN:VTIMEZONE"));
            assert_eq!(rec.extra.last().map(String::as_str), Some("END:VTIMEZONE"));
            assert_eq!(rec.extra.len(), 10);
        }

        #[test]
        fn zoned_fragment_survives_decode_then_encode() {
            let rec = IcsRecurrenceCodec.decode(&wrap_envelope(ZONED)).unwrap();
            let fragment = strip_envelope(&IcsRecurrenceCodec.encode(&rec).unwrap());

            for line in ZONED.split("\r\n").filter(|l| !l.starts_with("DTSTART;")) {
                assert!(fragment.contains(line), "{} missing from {}", line, fragment);
            }
            let zone_start = fragment.find("BEGIN:VTIMEZONE").unwrap();
            assert!(fragment[zone_start..].ends_with("END:VTIMEZONE"));
            assert!(!fragment.contains("DTEND"));
            assert_eq!(IcsRecurrenceCodec.decode(&wrap_envelope(&fragment)).unwrap(), rec);
        }

        #[test]
        fn folded_lines_are_joined() {
            let text = wrap_envelope("RRULE:FREQ=DAILY\r\nEXDATE;VALUE=DATE:20070502,\r\n 20070503");
            let rec = IcsRecurrenceCodec.decode(&text).unwrap();
            assert_eq!(rec.exdates, vec!["EXDATE;VALUE=DATE:20070502,20070503"]);
        }

        #[test]
        fn encoded_fragment_has_no_envelope_or_stamps() {
            let rec = Recurrence::new(RecurrenceTime::Date(
                NaiveDate::from_ymd_opt(2007, 5, 1).unwrap(),
            ))
            .with_rule("FREQ=DAILY;COUNT=3");
            let fragment = strip_envelope(&IcsRecurrenceCodec.encode(&rec).unwrap());

            assert!(!fragment.contains("BEGIN:"));
            assert!(!fragment.contains("END:"));
            assert!(!fragment.contains("DTSTAMP"));
            assert!(!fragment.contains("UID"));
            assert!(fragment.contains("RRULE:FREQ=DAILY"));
            assert!(fragment.contains("20070501"));
        }
    }
}
